use sightline_common::Domain;

use crate::culler::Culler;

/// Per-domain snapshot for developer tooling.
#[derive(Debug, Clone)]
pub struct DomainSummary {
    pub domain: Domain,
    pub tracked: usize,
    pub realized: usize,
    pub pending: usize,
}

/// Read-only snapshot of the culling context for debugging and dev UI.
#[derive(Debug, Clone)]
pub struct CullSummary {
    pub generation: u64,
    pub exempt: usize,
    pub domains: Vec<DomainSummary>,
}

impl CullSummary {
    pub fn capture(culler: &Culler) -> Self {
        Self {
            generation: culler.generation(),
            exempt: culler.exempt_count(),
            domains: Domain::ALL
                .into_iter()
                .map(|domain| DomainSummary {
                    domain,
                    tracked: culler.tracked_count(domain),
                    realized: culler.realized_count(domain),
                    pending: culler.pending_count(domain),
                })
                .collect(),
        }
    }

    pub fn total_tracked(&self) -> usize {
        self.domains.iter().map(|d| d.tracked).sum()
    }

    pub fn total_pending(&self) -> usize {
        self.domains.iter().map(|d| d.pending).sum()
    }
}

impl std::fmt::Display for DomainSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: tracked={} realized={} pending={}",
            self.domain, self.tracked, self.realized, self.pending
        )
    }
}

impl std::fmt::Display for CullSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Culler: generation={} exempt={} tracked={} pending={}",
            self.generation,
            self.exempt,
            self.total_tracked(),
            self.total_pending()
        )?;
        for domain in &self.domains {
            writeln!(f, "  {domain}")?;
        }
        Ok(())
    }
}
