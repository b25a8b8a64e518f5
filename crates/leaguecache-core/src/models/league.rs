use serde::{Deserialize, Deserializer, Serialize};

/// Treat JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct League {
    #[serde(rename = "idLeague", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "strLeague", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "strSport", default, deserialize_with = "null_as_default")]
    pub sport: String,
    #[serde(rename = "strLeagueAlternate", default, deserialize_with = "null_as_default")]
    pub alternate_name: String,
}

impl League {
    /// Alternate name for display, or `None` when the API left it blank
    pub fn alternate_display(&self) -> Option<&str> {
        let alt = self.alternate_name.trim();
        if alt.is_empty() {
            None
        } else {
            Some(alt)
        }
    }

    pub fn sport_display(&self) -> &str {
        if self.sport.is_empty() {
            "Unknown sport"
        } else {
            &self.sport
        }
    }
}

/// Response from `all_leagues.php`. The API sends `null` instead of `[]`
/// when nothing matches.
#[derive(Debug, Default, Deserialize)]
pub struct LeaguesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub leagues: Vec<League>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Season {
    #[serde(rename = "strSeason", default)]
    pub name: Option<String>,
    #[serde(rename = "strBadge", default)]
    pub badge: Option<String>,
}

/// Response from `search_all_seasons.php`
#[derive(Debug, Default, Deserialize)]
pub struct SeasonsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub seasons: Vec<Season>,
}

impl SeasonsResponse {
    /// Badge of the first season, if the API gave it one
    pub fn first_badge(&self) -> Option<&str> {
        self.seasons
            .first()
            .and_then(|s| s.badge.as_deref())
            .filter(|b| !b.is_empty())
    }
}
