use std::fmt;

// ---------------------------------------------------------------------------
// Region – top-level selector sent to the endpoint as `regiao`
// ---------------------------------------------------------------------------

/// Brazilian macro-region used to narrow the fetch server-side.
///
/// `Brazil` is the "no value chosen" sentinel: it sends an empty `regiao`
/// and the endpoint returns every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    #[default]
    Brazil,
    CentralWest,
    South,
    Southeast,
    Northeast,
    North,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Brazil,
        Region::CentralWest,
        Region::South,
        Region::Southeast,
        Region::Northeast,
        Region::North,
    ];

    /// Label shown in the selector.
    pub fn label(self) -> &'static str {
        match self {
            Region::Brazil => "Brasil",
            Region::CentralWest => "Centro-Oeste",
            Region::South => "Sul",
            Region::Southeast => "Sudeste",
            Region::Northeast => "Nordeste",
            Region::North => "Norte",
        }
    }

    /// Value of the `regiao` query parameter (lowercased label, empty for all).
    pub fn query_value(self) -> String {
        match self {
            Region::Brazil => String::new(),
            other => other.label().to_lowercase(),
        }
    }

    /// State codes (UF) belonging to this region. Empty for `Brazil`.
    pub fn states(self) -> &'static [&'static str] {
        match self {
            Region::Brazil => &[],
            Region::CentralWest => &["DF", "GO", "MS", "MT"],
            Region::South => &["PR", "RS", "SC"],
            Region::Southeast => &["ES", "MG", "RJ", "SP"],
            Region::Northeast => &["AL", "BA", "CE", "MA", "PB", "PE", "PI", "RN", "SE"],
            Region::North => &["AC", "AM", "AP", "PA", "RO", "RR", "TO"],
        }
    }

    /// Whether a purchase location passes this region's filter.
    pub fn contains(self, location: &str) -> bool {
        match self {
            Region::Brazil => true,
            region => region
                .states()
                .iter()
                .any(|uf| uf.eq_ignore_ascii_case(location.trim())),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brazil_sends_empty_region() {
        assert_eq!(Region::Brazil.query_value(), "");
        assert_eq!(Region::CentralWest.query_value(), "centro-oeste");
        assert_eq!(Region::Southeast.query_value(), "sudeste");
    }

    #[test]
    fn every_state_belongs_to_exactly_one_region() {
        let mut seen: Vec<&str> = Region::ALL
            .iter()
            .flat_map(|r| r.states().iter().copied())
            .collect();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), total);
        assert_eq!(total, 27);
    }

    #[test]
    fn contains_matches_state_codes() {
        assert!(Region::Brazil.contains("anything"));
        assert!(Region::South.contains("RS"));
        assert!(Region::South.contains("sc"));
        assert!(!Region::South.contains("SP"));
    }
}
