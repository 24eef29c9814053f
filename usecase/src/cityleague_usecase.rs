use chrono::NaiveDate;
use database::CityleagueRepository;
use itertools::Itertools;
use types::{CityleagueResult, CityleagueSchedule, LeagueType};

use crate::error::UsecaseError;

pub struct CityleagueUsecase<R> {
    repository: R,
}

impl<R: CityleagueRepository> CityleagueUsecase<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn find_schedules(&self) -> Result<Vec<CityleagueSchedule>, UsecaseError> {
        Ok(self.repository.find_schedules().await?)
    }

    pub async fn find_schedule_by_id(&self, id: &str) -> Result<CityleagueSchedule, UsecaseError> {
        Ok(self.repository.find_schedule_by_id(id).await?)
    }

    pub async fn save_schedule(&self, schedule: &CityleagueSchedule) -> Result<(), UsecaseError> {
        if schedule.from_date > schedule.to_date {
            return Err(UsecaseError::Validation(format!(
                "schedule {} ends ({}) before it starts ({})",
                schedule.id, schedule.to_date, schedule.from_date
            )));
        }
        Ok(self.repository.save_schedule(schedule).await?)
    }

    pub async fn find_by_schedule_id(
        &self,
        schedule_id: &str,
        league_type: Option<LeagueType>,
    ) -> Result<Vec<CityleagueResult>, UsecaseError> {
        Ok(self
            .repository
            .find_results_by_schedule_id(schedule_id, league_type)
            .await?)
    }

    pub async fn find_by_date(
        &self,
        date: NaiveDate,
        league_type: Option<LeagueType>,
    ) -> Result<Vec<CityleagueResult>, UsecaseError> {
        Ok(self.repository.find_results_by_date(date, league_type).await?)
    }

    /// Stores one official event's placements, replacing any stored before.
    pub async fn save(&self, result: &CityleagueResult) -> Result<(), UsecaseError> {
        let schedule = self
            .repository
            .find_schedule_by_id(&result.cityleague_schedule_id)
            .await?;
        if !schedule.contains(result.event_date) {
            return Err(UsecaseError::Validation(format!(
                "event {} on {} is outside schedule {}",
                result.official_event_id, result.event_date, schedule.id
            )));
        }
        if result.results.is_empty() {
            return Err(UsecaseError::Validation(format!(
                "official event {} has no placements",
                result.official_event_id
            )));
        }
        if let Some(stray) = result
            .results
            .iter()
            .find(|event_result| event_result.official_event_id != result.official_event_id)
        {
            return Err(UsecaseError::Validation(format!(
                "placement of {} belongs to event {}, not {}",
                stray.player_id, stray.official_event_id, result.official_event_id
            )));
        }
        if let Some(player_id) = result
            .results
            .iter()
            .map(|event_result| &event_result.player_id)
            .duplicates()
            .next()
        {
            return Err(UsecaseError::Validation(format!(
                "player {player_id} placed twice in event {}",
                result.official_event_id
            )));
        }

        self.repository.save_result(result).await?;
        log::info!(
            "Saved {} placements of official event {}",
            result.results.len(),
            result.official_event_id
        );
        Ok(())
    }
}
