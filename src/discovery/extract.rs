//! Endpoint extraction from the membership list.
//!
//! # Responsibilities
//! - Keep alive members only
//! - Match service tags (`smart:<service>` and `smart:<service>_<port>`)
//! - Split tag values into host and port
//! - Mark every non-primary endpoint as backup when a primary host is set
//! - Produce a canonically sorted list
//!
//! # Design Decisions
//! - The service name is matched literally, never as a pattern
//! - Tag values without a `host:port` shape are skipped, not fatal
//! - A member with several matching tags yields one endpoint per tag

use regex::Regex;

use crate::backends::{Endpoint, BACKUP_ANNOTATION};
use crate::discovery::error::{DiscoveryError, DiscoveryResult};
use crate::discovery::members::MemberRecord;
use crate::observability::metrics;

/// Tag prefix the provisioning tooling uses for service registrations.
pub const SERVICE_TAG_PREFIX: &str = "smart:";

/// Matches the tags registering a given service.
///
/// The numeric suffix exists because one host may run the same service on
/// several ports, each registered under its own tag.
#[derive(Debug, Clone)]
pub struct ServiceTagMatcher {
    pattern: Regex,
}

impl ServiceTagMatcher {
    pub fn new(service: &str) -> DiscoveryResult<Self> {
        let source = format!(
            "^{}{}(?:_[0-9]+)?$",
            regex::escape(SERVICE_TAG_PREFIX),
            regex::escape(service)
        );
        let pattern = Regex::new(&source).map_err(|source| DiscoveryError::InvalidService {
            service: service.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.pattern.is_match(tag)
    }
}

/// Turns member records into the endpoint list of one service.
#[derive(Debug, Clone)]
pub struct EndpointExtractor {
    service: String,
    matcher: ServiceTagMatcher,
    primary_host: Option<String>,
}

impl EndpointExtractor {
    /// Create an extractor for `service`.
    ///
    /// With `primary_host` set, every endpoint on another host is annotated
    /// as a backup.
    pub fn new(service: impl Into<String>, primary_host: Option<String>) -> DiscoveryResult<Self> {
        let service = service.into();
        let matcher = ServiceTagMatcher::new(&service)?;
        Ok(Self {
            service,
            matcher,
            primary_host,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Extract the sorted endpoint list.
    pub fn extract(&self, members: &[MemberRecord]) -> Vec<Endpoint> {
        let mut endpoints = Vec::new();

        for member in members.iter().filter(|m| m.is_alive()) {
            for (tag, value) in &member.tags {
                if !self.matcher.matches(tag) {
                    continue;
                }

                let Some((host, port)) = split_host_port(value) else {
                    tracing::warn!(
                        service = %self.service,
                        member = %member.name,
                        tag = %tag,
                        value = %value,
                        "Skipping tag value without host:port"
                    );
                    metrics::record_malformed_endpoint(&self.service);
                    continue;
                };

                let endpoint = Endpoint::new(&member.name, host, port)
                    .with_extra_config(self.extra_config_for(host));

                tracing::debug!(
                    service = %self.service,
                    member = %member.name,
                    address = %endpoint.address(),
                    "Discovered backend"
                );
                endpoints.push(endpoint);
            }
        }

        endpoints.sort();
        endpoints
    }

    fn extra_config_for(&self, host: &str) -> &'static str {
        match &self.primary_host {
            Some(primary) if primary != host => BACKUP_ANNOTATION,
            _ => "",
        }
    }
}

/// Split on the first colon; both halves must be non-empty.
fn split_host_port(value: &str) -> Option<(&str, &str)> {
    let (host, port) = value.split_once(':')?;
    if host.is_empty() || port.is_empty() {
        return None;
    }
    Some((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::members::MemberStatus;
    use std::collections::HashMap;

    fn member(name: &str, status: MemberStatus, tags: &[(&str, &str)]) -> MemberRecord {
        MemberRecord {
            name: name.to_string(),
            status,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_tag_matcher() {
        let matcher = ServiceTagMatcher::new("foo").unwrap();
        assert!(matcher.matches("smart:foo"));
        assert!(matcher.matches("smart:foo_9000"));

        assert!(!matcher.matches("smart:foobar"));
        assert!(!matcher.matches("smart:foo_"));
        assert!(!matcher.matches("smart:foo_90x"));
        assert!(!matcher.matches("smart:fo"));
        assert!(!matcher.matches("foo"));
        assert!(!matcher.matches("xsmart:foo"));
    }

    #[test]
    fn test_service_name_is_literal() {
        let matcher = ServiceTagMatcher::new("a.b").unwrap();
        assert!(matcher.matches("smart:a.b"));
        assert!(!matcher.matches("smart:axb"));
    }

    #[test]
    fn test_extracts_matching_tags_of_alive_members() {
        let members = vec![
            member("m1", MemberStatus::Alive, &[("smart:foo", "10.0.0.1:80"), ("role", "web")]),
            member("m2", MemberStatus::Alive, &[("smart:foo_9000", "10.0.0.2:9000")]),
            member("m3", MemberStatus::Alive, &[("smart:foobar", "10.0.0.3:80")]),
            member("m4", MemberStatus::Other, &[("smart:foo", "10.0.0.4:80")]),
        ];

        let extractor = EndpointExtractor::new("foo", None).unwrap();
        let endpoints = extractor.extract(&members);

        assert_eq!(
            endpoints,
            vec![
                Endpoint::new("m1", "10.0.0.1", "80"),
                Endpoint::new("m2", "10.0.0.2", "9000"),
            ]
        );
    }

    #[test]
    fn test_multi_port_member_yields_one_endpoint_per_tag() {
        let members = vec![member(
            "m1",
            MemberStatus::Alive,
            &[("smart:foo_3306", "10.0.0.1:3306"), ("smart:foo_3307", "10.0.0.1:3307")],
        )];

        let endpoints = EndpointExtractor::new("foo", None).unwrap().extract(&members);
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].port, "3306");
        assert_eq!(endpoints[1].port, "3307");
    }

    #[test]
    fn test_backup_annotation_spares_primary() {
        let members = vec![
            member("m1", MemberStatus::Alive, &[("smart:foo", "10.0.0.1:80")]),
            member("m2", MemberStatus::Alive, &[("smart:foo", "10.0.0.2:80")]),
        ];

        let extractor = EndpointExtractor::new("foo", Some("10.0.0.1".to_string())).unwrap();
        let endpoints = extractor.extract(&members);

        assert_eq!(endpoints[0].host, "10.0.0.1");
        assert_eq!(endpoints[0].extra_config, "");
        assert_eq!(endpoints[1].host, "10.0.0.2");
        assert_eq!(endpoints[1].extra_config, BACKUP_ANNOTATION);
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        let members = vec![member(
            "m1",
            MemberStatus::Alive,
            &[
                ("smart:foo", "10.0.0.1"),
                ("smart:foo_1", ":80"),
                ("smart:foo_2", "10.0.0.1:"),
                ("smart:foo_3", "10.0.0.1:8080"),
            ],
        )];

        let endpoints = EndpointExtractor::new("foo", None).unwrap().extract(&members);
        assert_eq!(endpoints, vec![Endpoint::new("m1", "10.0.0.1", "8080")]);
    }

    #[test]
    fn test_port_keeps_text_after_first_colon() {
        assert_eq!(split_host_port("h:1:2"), Some(("h", "1:2")));
    }

    #[test]
    fn test_order_is_independent_of_input_order() {
        let members = vec![
            member("c", MemberStatus::Alive, &[("smart:foo", "10.0.0.3:80")]),
            member("a", MemberStatus::Alive, &[("smart:foo", "10.0.0.1:80"), ("smart:foo_81", "10.0.0.1:81")]),
            member("b", MemberStatus::Alive, &[("smart:foo", "10.0.0.2:80")]),
        ];
        let extractor = EndpointExtractor::new("foo", Some("10.0.0.2".to_string())).unwrap();
        let expected = extractor.extract(&members);

        let mut reversed = members.clone();
        reversed.reverse();
        assert_eq!(extractor.extract(&reversed), expected);

        let rotated = vec![members[1].clone(), members[2].clone(), members[0].clone()];
        assert_eq!(extractor.extract(&rotated), expected);
    }
}
