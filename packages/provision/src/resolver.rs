// ABOUTME: Maps a site hostname to the Cloudflare zone that serves it
// ABOUTME: Exact lookup first, then a longest-suffix scan over the active zones

use tracing::debug;

use edgecron_cloudflare::{ApiClient, Zone};

use crate::error::{SetupError, SetupResult};

/// Find the zone responsible for `host`.
///
/// The exact lookup short-circuits; when it misses (or errors, the
/// listing is the authority) the first page of active zones is scanned
/// for the longest matching suffix. No match is an error naming the
/// host, never a silent guess.
pub async fn resolve_zone(api: &ApiClient, host: &str) -> SetupResult<Zone> {
    match api.find_zone(host).await {
        Ok(Some(zone)) => {
            debug!("Exact zone match for {}: {}", host, zone.name);
            return Ok(zone);
        }
        Ok(None) => {}
        Err(e) => debug!("Exact zone lookup failed, falling back to listing: {}", e),
    }

    let zones = api
        .list_zones()
        .await
        .map_err(|e| SetupError::ZoneListing(e.to_string()))?;

    best_zone_match(&zones, host)
        .cloned()
        .ok_or_else(|| SetupError::NoZone(host.to_string()))
}

/// Pick the zone whose name equals `host` or is its registrable suffix,
/// preferring the longest name. Strictly greater length wins, so the
/// first of equal-length candidates stays.
pub fn best_zone_match<'a>(zones: &'a [Zone], host: &str) -> Option<&'a Zone> {
    let mut best: Option<&Zone> = None;
    let mut best_len = 0;

    for zone in zones {
        if zone.name.is_empty() {
            continue;
        }
        let is_match = host == zone.name || host.ends_with(&format!(".{}", zone.name));
        if !is_match {
            continue;
        }
        if zone.name.len() > best_len {
            best = Some(zone);
            best_len = zone.name.len();
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str) -> Zone {
        Zone {
            id: format!("id-{}", name),
            name: name.to_string(),
            account: edgecron_cloudflare::ZoneAccount {
                id: "acc-1".to_string(),
            },
        }
    }

    #[test]
    fn subdomains_resolve_to_their_zone() {
        let zones = vec![zone("example.com"), zone("other.org")];

        assert_eq!(
            best_zone_match(&zones, "a.example.com").map(|z| z.name.as_str()),
            Some("example.com")
        );
        assert_eq!(
            best_zone_match(&zones, "example.com").map(|z| z.name.as_str()),
            Some("example.com")
        );
        assert_eq!(
            best_zone_match(&zones, "b.other.org").map(|z| z.name.as_str()),
            Some("other.org")
        );
    }

    #[test]
    fn longest_suffix_wins_the_tie_break() {
        let zones = vec![zone("example.com"), zone("staging.example.com")];

        assert_eq!(
            best_zone_match(&zones, "blog.staging.example.com").map(|z| z.name.as_str()),
            Some("staging.example.com")
        );
        // Order must not matter
        let reversed = vec![zone("staging.example.com"), zone("example.com")];
        assert_eq!(
            best_zone_match(&reversed, "blog.staging.example.com").map(|z| z.name.as_str()),
            Some("staging.example.com")
        );
    }

    #[test]
    fn unmatched_host_returns_nothing() {
        let zones = vec![zone("example.com")];
        assert!(best_zone_match(&zones, "unrelated.net").is_none());
        assert!(best_zone_match(&[], "example.com").is_none());
    }

    #[test]
    fn name_must_be_a_label_boundary_suffix() {
        // "badexample.com" ends with "example.com" textually but is a
        // different registrable domain
        let zones = vec![zone("example.com")];
        assert!(best_zone_match(&zones, "badexample.com").is_none());
    }

    #[test]
    fn nameless_zone_entries_are_skipped() {
        let zones = vec![
            Zone {
                id: "id-empty".to_string(),
                name: String::new(),
                account: edgecron_cloudflare::ZoneAccount {
                    id: "acc-1".to_string(),
                },
            },
            zone("example.com"),
        ];
        assert_eq!(
            best_zone_match(&zones, "www.example.com").map(|z| z.name.as_str()),
            Some("example.com")
        );
    }
}
