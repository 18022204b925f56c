use serde::Serialize;

use crate::scan::evolution::EvolutionCost;

/// Everything read from one creature detail screenshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScanResult {
    /// Estimated creature level, 1.0 when no arc marker was found.
    pub level: f64,
    pub name: String,
    pub candy_name: String,
    pub hp: Option<u32>,
    pub cp: Option<u32>,
    /// Always `None` while candy amount scanning is disabled.
    pub candy_amount: Option<u32>,
    pub evolution_cost: EvolutionCost,
}

impl ScanResult {
    /// True if every numeric field came back readable.
    pub fn is_complete(&self) -> bool {
        self.hp.is_some() && self.cp.is_some() && self.evolution_cost != EvolutionCost::Unreadable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScanResult {
        ScanResult {
            level: 20.5,
            name: "Pidgey".to_string(),
            candy_name: "Pidgey".to_string(),
            hp: Some(56),
            cp: Some(412),
            candy_amount: None,
            evolution_cost: EvolutionCost::Candy(12),
        }
    }

    #[test]
    fn test_is_complete() {
        let mut result = sample();
        assert!(result.is_complete());

        result.evolution_cost = EvolutionCost::FullyEvolved;
        assert!(result.is_complete());

        result.cp = None;
        assert!(!result.is_complete());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["level"], 20.5);
        assert_eq!(json["candy_name"], "Pidgey");
        assert_eq!(json["candy_amount"], serde_json::Value::Null);
        assert_eq!(json["evolution_cost"], 12);
    }
}
