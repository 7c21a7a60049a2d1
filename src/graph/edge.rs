/// Directed edge `from -> to`: the output of `from` feeds `to`.
///
/// Identity is the insertion-order counter assigned by the store, never a
/// `(from, to)` pair: two steps may legitimately be connected more than
/// once (fan-out of one output into several inputs of the same job).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: u64,
    pub from: String,
    pub to: String,
}
