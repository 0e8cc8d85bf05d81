use anyhow::Result;
use shared::{DashboardStats, InstitutionCount};
use tracing::info;

use crate::storage::{CadetStorage, Connection, InstitutionStorage};

/// Aggregate counts across every institution for the dashboard
#[derive(Clone)]
pub struct DashboardService<C: Connection> {
    institutions: C::InstitutionRepository,
    cadets: C::CadetRepository,
}

impl<C: Connection> DashboardService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            institutions: connection.create_institution_repository(),
            cadets: connection.create_cadet_repository(),
        }
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let institutions = self.institutions.list_institutions().await?;
        let cadets = self.cadets.list_all_cadets().await?;

        let mut stats = DashboardStats {
            total_institutions: institutions.len(),
            total_cadets: cadets.len(),
            ..Default::default()
        };

        for institution in &institutions {
            stats.cadets_per_institution.push(InstitutionCount {
                institution_id: institution.id.clone(),
                name: institution.name.clone(),
                cadet_count: cadets
                    .iter()
                    .filter(|c| c.institution_id == institution.id)
                    .count(),
            });
        }

        for cadet in &cadets {
            *stats
                .cadets_per_rank
                .entry(cadet.rank.code().to_string())
                .or_default() += 1;
            *stats.cadets_per_batch.entry(cadet.batch).or_default() += 1;
            if let Some(division) = cadet.division {
                *stats
                    .cadets_per_division
                    .entry(division.code().to_string())
                    .or_default() += 1;
            }
            for camp in &cadet.camps {
                stats.total_camps += 1;
                *stats
                    .camps_per_type
                    .entry(camp.camp_type.code().to_string())
                    .or_default() += 1;
            }
            for certificate in &cadet.certificates {
                stats.total_certificates += 1;
                *stats
                    .certificates_per_type
                    .entry(certificate.certificate_type.label().to_string())
                    .or_default() += 1;
            }
        }

        info!(
            "📊 Dashboard: {} institutions, {} cadets, {} camps",
            stats.total_institutions, stats.total_cadets, stats.total_camps
        );
        Ok(stats)
    }
}
