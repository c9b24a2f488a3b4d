use super::read_resource;
use crate::domain::values::seed_url::SeedUrl;
use std::path::Path;

pub fn parse_seeds(json: &str) -> Result<Vec<SeedUrl>, serde_json::Error> {
    let seeds: Vec<SeedUrl> = serde_json::from_str(json)?;
    Ok(seeds
        .into_iter()
        .map(|s| SeedUrl::new(s.url, s.kind))
        .filter(|s| !s.url.is_empty())
        .collect())
}

pub fn load_seeds(path: &Path) -> Vec<SeedUrl> {
    let Some(contents) = read_resource(path, "seeds") else {
        return Vec::new();
    };
    match parse_seeds(&contents) {
        Ok(seeds) => seeds,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "malformed seeds file");
            Vec::new()
        }
    }
}
