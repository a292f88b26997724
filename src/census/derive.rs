use std::fmt;

/// Two-valued sex category carried by the census `P08` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SexCategory {
    Hombre,
    Mujer,
}

impl SexCategory {
    pub const ALL: [SexCategory; 2] = [SexCategory::Hombre, SexCategory::Mujer];

    /// Maps a raw sex code; anything other than 1 or 2 has no category.
    #[inline]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Hombre),
            2 => Some(Self::Mujer),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hombre => "Hombre",
            Self::Mujer => "Mujer",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sex| sex.label() == label)
    }
}

impl fmt::Display for SexCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Fixed five-bucket age scheme with bounds `[0, 18, 30, 45, 65, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBand {
    Under18,
    From18To29,
    From30To44,
    From45To64,
    Over65,
}

impl AgeBand {
    pub const ALL: [AgeBand; 5] = [
        AgeBand::Under18,
        AgeBand::From18To29,
        AgeBand::From30To44,
        AgeBand::From45To64,
        AgeBand::Over65,
    ];

    /// Bucket edges; every band is closed below and open above except the
    /// last, which includes 100.
    pub const BOUNDS: [i64; 6] = [0, 18, 30, 45, 65, 100];

    /// Assigns the band for an age. Ages outside `[0, 100]` have no band.
    pub fn from_age(age: i64) -> Option<Self> {
        let last = Self::BOUNDS.len() - 1;
        if age < Self::BOUNDS[0] || age > Self::BOUNDS[last] { return None }
        Self::BOUNDS.windows(2)
            .position(|edge| age < edge[1])
            .map(|i| Self::ALL[i])
            .or(Some(Self::ALL[last - 1]))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Under18 => "0-17",
            Self::From18To29 => "18-29",
            Self::From30To44 => "30-44",
            Self::From45To64 => "45-64",
            Self::Over65 => "65+",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.label() == label)
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}
