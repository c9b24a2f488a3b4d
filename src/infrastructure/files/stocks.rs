use super::read_resource;
use crate::domain::entities::stock::Stock;
use crate::domain::entities::stock_registry::StockRegistry;
use std::path::Path;

/// Parse a JSON array of `{company, symbol, exchange}` records.
pub fn parse_stocks(json: &str) -> Result<StockRegistry, serde_json::Error> {
    let stocks: Vec<Stock> = serde_json::from_str(json)?;
    Ok(StockRegistry::new(stocks.into_iter().map(Stock::normalized)))
}

pub fn load_stocks(path: &Path) -> StockRegistry {
    let Some(contents) = read_resource(path, "stocks") else {
        return StockRegistry::empty();
    };
    match parse_stocks(&contents) {
        Ok(registry) => {
            tracing::info!(stocks = registry.len(), "stocks of interest loaded");
            registry
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "malformed stocks file");
            StockRegistry::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_drops_symbolless() {
        let registry = parse_stocks(
            r#"[
                {"company": " Acme Corp ", "symbol": " ACME ", "exchange": "NYSE"},
                {"company": "Nameless"},
                {"company": "Globex", "symbol": "GBX"}
            ]"#,
        )
        .unwrap();
        assert_eq!(registry.len(), 2);
        let acme = registry.get("ACME").unwrap();
        assert_eq!(acme.company(), Some("Acme Corp"));
        assert!(registry.get("GBX").unwrap().exchange().is_none());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stocks.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_stocks(&path).is_empty());
        assert!(load_stocks(&dir.path().join("missing.json")).is_empty());
    }
}
