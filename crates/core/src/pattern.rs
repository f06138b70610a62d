//! Keyword pattern compiler.
//!
//! Builtin auto-reply rules require every keyword fragment to appear
//! somewhere in an incoming message, in any order. The target engine (the
//! `regex` crate at match time) has no lookahead, so the conjunction is
//! expressed by enumerating every ordering of the fragments as one
//! alternation: `(?is)(?:.*(a).*(b).*|.*(b).*(a).*)`.

/// Upper bound on fragments accepted by [`compile_keyword_pattern`].
///
/// Pattern size grows with N!, so anything past 6 fragments (720 branches)
/// is rejected and the entry is skipped by callers.
pub const DEFAULT_MAX_FRAGMENTS: usize = 6;

/// Compile an unordered keyword fragment list into a single pattern.
///
/// Each fragment is itself a regex sub-expression carrying its own grouping
/// parentheses, e.g. `(open|create)`; fragments are inserted verbatim.
/// Returns the empty string when no usable pattern exists: every fragment
/// blank, or more fragments than [`DEFAULT_MAX_FRAGMENTS`]. Callers treat an
/// empty pattern as "skip this entry".
pub fn compile_keyword_pattern(keywords: &[String]) -> String {
    compile_with_fragment_limit(keywords, DEFAULT_MAX_FRAGMENTS)
}

/// Same as [`compile_keyword_pattern`] with an explicit fragment cap.
pub fn compile_with_fragment_limit(keywords: &[String], max_fragments: usize) -> String {
    let fragments: Vec<&str> =
        keywords.iter().map(|keyword| keyword.trim()).filter(|keyword| !keyword.is_empty()).collect();

    match fragments.len() {
        0 => String::new(),
        1 => format!("(?i){}", fragments[0]),
        count if count > max_fragments => String::new(),
        _ => {
            let mut branches: Vec<String> = Vec::new();
            let mut order: Vec<usize> = (0..fragments.len()).collect();
            permute(&mut order, 0, &mut |ordering| {
                let branch = render_branch(&fragments, ordering);
                // Duplicate fragments produce textually identical orderings;
                // one branch carries the same meaning as all of them.
                if !branches.contains(&branch) {
                    branches.push(branch);
                }
            });

            format!("(?is)(?:{})", branches.join("|"))
        }
    }
}

/// One ordering rendered as `.*(kw1).*(kw2).*`: free text (including
/// newlines, under the `s` flag) before, between, and after the captures.
fn render_branch(fragments: &[&str], ordering: &[usize]) -> String {
    let mut branch = String::from(".*");
    for &index in ordering {
        branch.push_str(fragments[index]);
        branch.push_str(".*");
    }
    branch
}

fn permute(order: &mut Vec<usize>, from: usize, visit: &mut impl FnMut(&[usize])) {
    if from == order.len() {
        visit(order);
        return;
    }
    for swap in from..order.len() {
        order.swap(from, swap);
        permute(order, from + 1, visit);
        order.swap(from, swap);
    }
}
