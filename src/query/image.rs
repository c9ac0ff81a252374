//! Image request composition
//!
//! Carries the magnification policy and the coordinate defaulting matrix.
//! Defaults that need the image's native geometry are resolved against a
//! directory record the session looks up beforehand.

use crate::error::{AddeError, Result};
use crate::protocol::{Catalog, ImageDirectory};
use crate::query::{yes_no, Band, CoordPos, CoordType, DirectoryQuery, Position, ProtocolArgs};

/// Parameters of an image (area) request
#[derive(Debug, Clone)]
pub struct ImageQuery {
    /// Cataloged group name
    pub group: String,
    /// Cataloged descriptor name within the group
    pub descriptor: String,
    /// Dataset position. Image requests address exactly one stored image,
    /// so the position is a single number (negative = time-relative).
    pub position: i32,
    /// Band selector, always sent
    pub band: Band,

    /// Coordinate system of the start coordinates
    pub coord_type: CoordType,
    /// Anchoring of the start coordinates
    pub coord_pos: CoordPos,
    /// First start coordinate (line or latitude)
    pub coord_start1: Option<f64>,
    /// Second start coordinate (element or longitude)
    pub coord_start2: Option<f64>,

    /// Number of image lines to transmit
    pub lines: Option<u32>,
    /// Number of elements per line to transmit
    pub elements: Option<u32>,

    /// Day filter
    pub day: Option<String>,
    /// Start of the time filter, `hh:mm` or `hh:mm:ss`
    pub start_time: Option<String>,
    /// End of the time filter
    pub end_time: Option<String>,

    /// Calibration unit to request; defaults to the directory's stored unit
    pub unit: Option<String>,
    /// Bytes per data point; `X` leaves the stored spacing unchanged
    pub spacing: Option<String>,
    /// Calibration type; `X` leaves the stored calibration unchanged
    pub calibration: Option<String>,

    /// Line magnification factor (negative = downsample)
    pub line_mag: i32,
    /// Element magnification factor (negative = downsample)
    pub element_mag: i32,

    /// Whether the line documentation block is included
    pub doc: Option<bool>,
    /// Whether additional calibration information is sent
    pub aux: Option<bool>,
}

impl ImageQuery {
    pub fn new(
        group: impl Into<String>,
        descriptor: impl Into<String>,
        position: i32,
        band: Band,
    ) -> Self {
        Self {
            group: group.into(),
            descriptor: descriptor.into(),
            position,
            band,
            coord_type: CoordType::Area,
            coord_pos: CoordPos::Upper,
            coord_start1: None,
            coord_start2: None,
            lines: None,
            elements: None,
            day: None,
            start_time: None,
            end_time: None,
            unit: None,
            spacing: None,
            calibration: None,
            line_mag: 1,
            element_mag: 1,
            doc: Some(true),
            aux: Some(true),
        }
    }

    /// Set the coordinate system and anchoring
    pub fn coordinates(mut self, coord_type: CoordType, coord_pos: CoordPos) -> Self {
        self.coord_type = coord_type;
        self.coord_pos = coord_pos;
        self
    }

    /// Set explicit start coordinates
    pub fn start(mut self, dim1: f64, dim2: f64) -> Self {
        self.coord_start1 = Some(dim1);
        self.coord_start2 = Some(dim2);
        self
    }

    /// Set the transmitted window size
    pub fn window(mut self, lines: u32, elements: u32) -> Self {
        self.lines = Some(lines);
        self.elements = Some(elements);
        self
    }

    /// Set the day filter
    pub fn day(mut self, day: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self
    }

    /// Set the time filter
    pub fn time(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    /// Set the requested calibration unit
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the requested byte spacing
    pub fn spacing(mut self, spacing: impl Into<String>) -> Self {
        self.spacing = Some(spacing.into());
        self
    }

    /// Set the requested calibration type
    pub fn calibration(mut self, calibration: impl Into<String>) -> Self {
        self.calibration = Some(calibration.into());
        self
    }

    /// Set the magnification factors
    pub fn magnification(mut self, line_mag: i32, element_mag: i32) -> Self {
        self.line_mag = line_mag;
        self.element_mag = element_mag;
        self
    }

    /// Include or exclude the line documentation block
    pub fn doc(mut self, doc: bool) -> Self {
        self.doc = Some(doc);
        self
    }

    /// Include or exclude additional calibration information
    pub fn aux(mut self, aux: bool) -> Self {
        self.aux = Some(aux);
        self
    }

    /// Check every precondition that does not need a directory record
    pub(crate) fn validate(&self, catalog: &Catalog) -> Result<()> {
        catalog.validate_dataset(&self.group, &self.descriptor)?;

        if self.lines.is_some() != self.elements.is_some() {
            return Err(AddeError::Validation(
                "lines and elements must be supplied together".to_string(),
            ));
        }
        if self.coord_start1.is_some() != self.coord_start2.is_some() {
            return Err(AddeError::Validation(
                "both start coordinates must be supplied together".to_string(),
            ));
        }
        for time in [&self.start_time, &self.end_time].into_iter().flatten() {
            if !time.contains(':') {
                return Err(AddeError::Validation(format!(
                    "invalid time '{time}': expected hh:mm or hh:mm:ss"
                )));
            }
        }
        Ok(())
    }

    /// Whether composing this query needs a directory lookup to discover
    /// the image's native size
    pub fn needs_directory(&self) -> bool {
        self.lines.is_none() && self.elements.is_none()
    }

    /// The directory request used for the internal size lookup. Uses the
    /// same dataset/band/day/time filters as the image request itself; AUX
    /// is forced on so calibration units come back with the record.
    pub fn directory_query(&self) -> DirectoryQuery {
        DirectoryQuery {
            group: self.group.clone(),
            descriptor: self.descriptor.clone(),
            position: Position::At(self.position),
            band: Some(self.band),
            day: self.day.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            aux: Some(true),
        }
    }

    /// Compose the request text.
    ///
    /// `directory` supplies geometry defaults for whatever the caller left
    /// unset; it may be `None` when the query is fully explicit.
    pub fn compose<D: ImageDirectory>(
        &self,
        catalog: &Catalog,
        args: &ProtocolArgs,
        directory: Option<&D>,
    ) -> Result<String> {
        self.validate(catalog)?;

        let (lines, elements) = self.resolve_size(directory)?;
        let (line_mag, lines) = apply_magnification(self.line_mag, lines);
        let (element_mag, elements) = apply_magnification(self.element_mag, elements);
        let (start1, start2) = self.resolve_start(directory)?;

        let unit = self
            .unit
            .clone()
            .or_else(|| directory.and_then(|d| d.calibration_unit()));

        let mut parts = vec![
            format!("{} {} {}", self.group, self.descriptor, self.position),
            format!(
                "{}{} {} {} X {} {}",
                self.coord_type.code(),
                self.coord_pos.code(),
                start1,
                start2,
                lines,
                elements
            ),
            format!("LMAG={line_mag}"),
            format!("EMAG={element_mag}"),
            format!("BAND={}", self.band),
        ];

        if let Some(day) = &self.day {
            parts.push(format!("DAY={day}"));
        }
        if let (Some(start), Some(end)) = (&self.start_time, &self.end_time) {
            parts.push(format!("TIME={start} {end}"));
        }
        if let Some(unit) = unit {
            parts.push(format!("UNIT={unit}"));
        }
        parts.push(format!("SPAC={}", self.spacing.as_deref().unwrap_or("X")));
        parts.push(format!("CAL={}", self.calibration.as_deref().unwrap_or("X")));
        if let Some(doc) = self.doc {
            parts.push(format!("DOC={}", yes_no(doc)));
        }
        if let Some(aux) = self.aux {
            parts.push(format!("AUX={}", yes_no(aux)));
        }
        parts.push(args.clauses());

        Ok(parts.join(" "))
    }

    /// Transmitted window size: explicit, else the directory's native size
    fn resolve_size<D: ImageDirectory>(&self, directory: Option<&D>) -> Result<(u32, u32)> {
        match (self.lines, self.elements) {
            (Some(l), Some(e)) => Ok((l, e)),
            _ => {
                let dir = directory.ok_or_else(|| {
                    AddeError::Validation(
                        "lines/elements unset and no directory record available to default from"
                            .to_string(),
                    )
                })?;
                Ok(dir.size())
            }
        }
    }

    /// Start coordinates per the (coordinate system, anchoring) matrix
    fn resolve_start<D: ImageDirectory>(&self, directory: Option<&D>) -> Result<(f64, f64)> {
        if let (Some(d1), Some(d2)) = (self.coord_start1, self.coord_start2) {
            return Ok((d1, d2));
        }

        let need = |what: &str| {
            AddeError::Validation(format!(
                "start coordinates required: supply coord_start1/coord_start2 ({what})"
            ))
        };

        match (self.coord_type, self.coord_pos) {
            (CoordType::Area, CoordPos::Upper) => Ok((0.0, 0.0)),
            (CoordType::Area, CoordPos::Centered) => {
                let dir = directory
                    .ok_or_else(|| need("area coordinates of the image center"))?;
                let (lines, elements) = dir.size();
                Ok((f64::from(lines / 2), f64::from(elements / 2)))
            }
            (CoordType::Image, CoordPos::Upper) => {
                let corner = directory
                    .and_then(ImageDirectory::upper_left)
                    .ok_or_else(|| need("image coordinates of the upper-left corner"))?;
                Ok((corner.0 as f64, corner.1 as f64))
            }
            (CoordType::Image, CoordPos::Centered) => {
                let (start_line, end_line, start_elem, end_elem) = directory
                    .and_then(ImageDirectory::image_box)
                    .ok_or_else(|| need("image coordinates of the image center"))?;
                Ok((
                    ((end_line - start_line) / 2) as f64,
                    ((end_elem - start_elem) / 2) as f64,
                ))
            }
            // The upper-left corner in earth coordinates cannot be derived
            // from the directory (geostationary navigation puts it off the
            // disk), so there is no safe default.
            (CoordType::Earth, CoordPos::Upper) => {
                Err(need("latitude/longitude of the upper-left corner"))
            }
            (CoordType::Earth, CoordPos::Centered) => {
                let ssp = directory
                    .and_then(ImageDirectory::subsatellite_point)
                    .ok_or_else(|| need("latitude/longitude of the image center"))?;
                Ok(ssp)
            }
        }
    }
}

/// Magnification policy: a negative factor is a downsample and divides the
/// transmitted count; a positive factor asks for a blow-up, which this
/// client does not perform, so the sent factor is forced to 1 and the count
/// is left unchanged.
fn apply_magnification(factor: i32, count: u32) -> (i32, u32) {
    if factor < 0 {
        (factor, count / factor.unsigned_abs())
    } else {
        (1, count)
    }
}
