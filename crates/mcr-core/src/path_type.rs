//! Route optimization target shared by the matrix, decision, and sim crates.

/// Which path matrix a routing decision consults.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PathType {
    /// Minimise travel time (default for unpredictable emergencies).
    #[default]
    Quickest,
    /// Minimise fuel consumption.
    FuelEfficient,
    /// No frequency data: the next destination must be supplied manually.
    AskUser,
}

impl PathType {
    /// `true` for the two types a matrix can be built for.
    #[inline]
    pub fn is_buildable(self) -> bool {
        !matches!(self, PathType::AskUser)
    }

    /// Human-readable label, used for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            PathType::Quickest      => "quickest",
            PathType::FuelEfficient => "fuel_efficient",
            PathType::AskUser       => "ask_user",
        }
    }
}

impl std::fmt::Display for PathType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
