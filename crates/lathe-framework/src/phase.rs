/// Points in the host compiler's pass sequence at which handlers may run.
///
/// Phases are ordered; a transformation run visits them in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Right after the front-end built the tree.
    Parse,
    /// Every field and method of every type has been discovered.
    Members,
    /// Statement lists have been stabilized by the intermediate semantic pass.
    Bodies,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Parse, Phase::Members, Phase::Bodies];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Members => "members",
            Phase::Bodies => "bodies",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
