//! Directory request composition

use crate::error::Result;
use crate::protocol::Catalog;
use crate::query::{yes_no, Band, Position, ProtocolArgs};

/// Parameters of a directory (metadata) request
#[derive(Debug, Clone)]
pub struct DirectoryQuery {
    /// Cataloged group name
    pub group: String,
    /// Cataloged descriptor name within the group
    pub descriptor: String,
    /// Dataset position selector
    pub position: Position,
    /// Band filter
    pub band: Option<Band>,
    /// Day filter, e.g. `2017-05-01`, `ccyyddd` or `yyddd`
    pub day: Option<String>,
    /// Start of the time filter, e.g. `14:00`
    pub start_time: Option<String>,
    /// End of the time filter; defaults to the start time
    pub end_time: Option<String>,
    /// Whether extra calibration data is included in comment cards
    pub aux: Option<bool>,
}

impl DirectoryQuery {
    pub fn new(
        group: impl Into<String>,
        descriptor: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            group: group.into(),
            descriptor: descriptor.into(),
            position,
            band: None,
            day: None,
            start_time: None,
            end_time: None,
            aux: None,
        }
    }

    /// Set the band filter
    pub fn band(mut self, band: Band) -> Self {
        self.band = Some(band);
        self
    }

    /// Set the day filter
    pub fn day(mut self, day: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self
    }

    /// Set the time filter. Meaningful only together with a day filter.
    pub fn time(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    /// Request extra calibration data in comment cards
    pub fn aux(mut self, aux: bool) -> Self {
        self.aux = Some(aux);
        self
    }

    /// Check group and descriptor against the cached catalog
    pub(crate) fn validate(&self, catalog: &Catalog) -> Result<()> {
        catalog.validate_dataset(&self.group, &self.descriptor)
    }

    /// Compose the request text.
    ///
    /// The time clause is emitted only when a day filter is set: time
    /// filtering is meaningless without a day filter in this protocol.
    pub fn compose(&self, catalog: &Catalog, args: &ProtocolArgs) -> Result<String> {
        self.validate(catalog)?;

        let mut parts = vec![format!(
            "{} {} {}",
            self.group, self.descriptor, self.position
        )];

        if let Some(band) = &self.band {
            parts.push(format!("BAND={band}"));
        }
        if let Some(day) = &self.day {
            parts.push(format!("DAY={day}"));
            if let Some(start) = &self.start_time {
                let end = self.end_time.as_deref().unwrap_or(start);
                parts.push(format!("TIME={start} {end}"));
            }
        }
        if let Some(aux) = self.aux {
            parts.push(format!("AUX={}", yes_no(aux)));
        }
        parts.push(args.clauses());

        Ok(parts.join(" "))
    }
}
