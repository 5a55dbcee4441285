//! Presentation-only symbol details.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolProfile {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub current_bid_price: Option<f64>,
}

impl SymbolProfile {
    pub fn display_name_or_na(&self) -> &str {
        self.display_name.as_deref().unwrap_or("N/A")
    }

    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or("No description available")
    }

    pub fn bid_or_na(&self) -> String {
        match self.current_bid_price {
            Some(bid) => format!("{:.2}", bid),
            None => "N/A".to_string(),
        }
    }
}
