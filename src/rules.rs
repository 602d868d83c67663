//! Ordered `(predicate, outcome)` tables.
//!
//! Threshold cascades live in `const` tables of [`Rule`]s so each row can be
//! tested on its own; [`first_match`] gives first-match-wins evaluation and
//! [`all_matches`] covers additive rules such as milestones.

pub struct Rule<I, O> {
    pub name: &'static str,
    pub when: fn(&I) -> bool,
    pub then: O,
}

pub fn first_match<'a, I, O>(rules: &'a [Rule<I, O>], input: &I) -> Option<&'a O> {
    rules.iter().find(|r| (r.when)(input)).map(|r| &r.then)
}

pub fn all_matches<'a, I, O>(
    rules: &'a [Rule<I, O>],
    input: &'a I,
) -> impl Iterator<Item = &'a O> + 'a {
    rules.iter().filter(move |r| (r.when)(input)).map(|r| &r.then)
}
