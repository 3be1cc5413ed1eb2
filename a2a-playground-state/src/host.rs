//! Discovered agents. The first entry is the primary agent.

use a2a_playground_protocol::AgentCard;
use tracing::debug;

use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostChange {
    Added,
    /// A descriptor with the same url was already present and was refreshed in place
    Replaced,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostState {
    hosts: Vec<AgentCard>,
}

/// Urls compare equal regardless of surrounding whitespace or a single trailing slash
fn same_url(a: &str, b: &str) -> bool {
    fn normalize(url: &str) -> &str {
        let url = url.trim();
        url.strip_suffix('/').unwrap_or(url)
    }
    normalize(a) == normalize(b)
}

impl HostState {
    pub fn hosts(&self) -> &[AgentCard] {
        &self.hosts
    }

    pub fn primary(&self) -> Option<&AgentCard> {
        self.hosts.first()
    }

    pub fn find(&self, url: &str) -> Option<&AgentCard> {
        self.hosts.iter().find(|card| same_url(&card.url, url))
    }

    fn upsert(&mut self, card: AgentCard) -> HostChange {
        match self.hosts.iter_mut().find(|h| same_url(&h.url, &card.url)) {
            Some(existing) => {
                *existing = card;
                HostChange::Replaced
            }
            None => {
                self.hosts.push(card);
                HostChange::Added
            }
        }
    }
}

impl Registry<HostState> {
    pub fn add_host(&self, card: AgentCard) -> HostChange {
        let url = card.url.clone();
        let change = self.update_with(|state| {
            let mut next = state.clone();
            let change = next.upsert(card);
            (Some(next), change)
        });
        debug!(%url, ?change, "Registered agent");
        change
    }

    pub fn remove_host(&self, url: &str) -> bool {
        self.update_with(|state| {
            let before = state.hosts.len();
            let hosts: Vec<AgentCard> = state
                .hosts
                .iter()
                .filter(|card| !same_url(&card.url, url))
                .cloned()
                .collect();
            if hosts.len() == before {
                (None, false)
            } else {
                (Some(HostState { hosts }), true)
            }
        })
    }

    pub fn primary(&self) -> Option<AgentCard> {
        self.snapshot().primary().cloned()
    }

    pub fn find(&self, url: &str) -> Option<AgentCard> {
        self.snapshot().find(url).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_playground_protocol::AgentCapabilities;
    use pretty_assertions::assert_eq;

    fn card(name: &str, url: &str) -> AgentCard {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "url": url,
            "version": "1.0.0"
        }))
        .expect("valid card")
    }

    #[test]
    fn duplicate_url_replaces_in_place() {
        let hosts = Registry::<HostState>::default();
        assert_eq!(hosts.add_host(card("A", "http://a.local")), HostChange::Added);
        assert_eq!(hosts.add_host(card("B", "http://b.local")), HostChange::Added);

        let mut refreshed = card("A v2", "http://a.local/");
        refreshed.capabilities = AgentCapabilities {
            streaming: true,
            ..AgentCapabilities::default()
        };
        assert_eq!(hosts.add_host(refreshed), HostChange::Replaced);

        let state = hosts.snapshot();
        let names: Vec<&str> = state.hosts().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["A v2", "B"]);
        assert!(state.primary().is_some_and(|p| p.capabilities.streaming));
    }

    #[test]
    fn remove_host_promotes_next_primary() {
        let hosts = Registry::<HostState>::default();
        hosts.add_host(card("A", "http://a.local"));
        hosts.add_host(card("B", "http://b.local"));

        assert!(hosts.remove_host("http://a.local/"));
        assert!(!hosts.remove_host("http://a.local"));
        assert_eq!(hosts.primary().map(|p| p.name), Some("B".to_string()));
        assert!(hosts.find("http://b.local").is_some());
    }

    #[test]
    fn only_one_trailing_slash_is_ignored() {
        assert!(same_url(" http://a.local/ ", "http://a.local"));
        assert!(!same_url("http://a.local//", "http://a.local"));

        let hosts = Registry::<HostState>::default();
        hosts.add_host(card("A", "http://a.local"));
        assert_eq!(hosts.add_host(card("A2", "http://a.local//")), HostChange::Added);
        assert_eq!(hosts.snapshot().hosts().len(), 2);
    }

    #[test]
    fn empty_registry_has_no_primary() {
        let hosts = Registry::<HostState>::default();
        assert!(hosts.primary().is_none());
    }
}
