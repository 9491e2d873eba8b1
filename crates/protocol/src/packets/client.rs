//! Client -> Server message validation.

use serde::Deserialize;

use crate::{Position, ProtocolError};

/// A coordinate pair as decoded from the wire, before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RawPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl RawPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    fn validate(&self, x_field: &'static str, y_field: &'static str) -> Result<Position, ProtocolError> {
        let x = self.x.ok_or(ProtocolError::MissingField(x_field))?;
        let y = self.y.ok_or(ProtocolError::MissingField(y_field))?;
        // Checked after quantizing: values near f64::MAX overflow on the way.
        let position = Position::new(x, y);
        if !position.x().is_finite() {
            return Err(ProtocolError::NonFinite(x_field));
        }
        if !position.y().is_finite() {
            return Err(ProtocolError::NonFinite(y_field));
        }
        Ok(position)
    }
}

/// Decoded `UPDATE_POSITION` payload.
///
/// `add` is the head the client moved to; `remove` is the tail the client
/// believes it dropped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PositionUpdateRequest {
    pub add: Option<RawPoint>,
    pub remove: Option<RawPoint>,
    #[serde(default)]
    pub boosting: Option<bool>,
}

/// A validated movement update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    /// New head position.
    pub add: Position,
    /// Tail position the client expects to be removed.
    pub remove: Position,
    /// Whether the client is boosting.
    pub boosting: bool,
}

impl PositionUpdateRequest {
    pub fn new(add: RawPoint, remove: RawPoint, boosting: bool) -> Self {
        Self {
            add: Some(add),
            remove: Some(remove),
            boosting: Some(boosting),
        }
    }

    /// Check that both points are present and complete.
    pub fn validate(&self) -> Result<PositionUpdate, ProtocolError> {
        let add = self.add.ok_or(ProtocolError::MissingField("add"))?;
        let remove = self.remove.ok_or(ProtocolError::MissingField("remove"))?;
        Ok(PositionUpdate {
            add: add.validate("add.x", "add.y")?,
            remove: remove.validate("remove.x", "remove.y")?,
            boosting: self.boosting.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_complete_update() {
        let req = PositionUpdateRequest::new(RawPoint::new(1.004, 2.0), RawPoint::new(0.0, 0.0), true);
        let update = req.validate().unwrap();
        assert_eq!(update.add, Position::new(1.0, 2.0));
        assert!(update.boosting);
    }

    #[test]
    fn test_missing_point_is_rejected() {
        let req = PositionUpdateRequest {
            add: Some(RawPoint::new(1.0, 2.0)),
            remove: None,
            boosting: None,
        };
        assert_eq!(req.validate(), Err(ProtocolError::MissingField("remove")));
    }

    #[test]
    fn test_missing_coordinate_is_rejected() {
        let req = PositionUpdateRequest::new(
            RawPoint { x: Some(1.0), y: None },
            RawPoint::new(0.0, 0.0),
            false,
        );
        assert_eq!(req.validate(), Err(ProtocolError::MissingField("add.y")));
    }

    #[test]
    fn test_non_finite_coordinate_is_rejected() {
        let req = PositionUpdateRequest::new(RawPoint::new(0.0, 0.0), RawPoint::new(f64::NAN, 0.0), false);
        assert_eq!(req.validate(), Err(ProtocolError::NonFinite("remove.x")));
    }

    #[test]
    fn test_overflowing_coordinate_is_rejected() {
        let req = PositionUpdateRequest::new(RawPoint::new(1e307, 0.0), RawPoint::new(0.0, 0.0), false);
        assert_eq!(req.validate(), Err(ProtocolError::NonFinite("add.x")));

        let req = PositionUpdateRequest::new(RawPoint::new(0.0, 0.0), RawPoint::new(0.0, -1e307), false);
        assert_eq!(req.validate(), Err(ProtocolError::NonFinite("remove.y")));
    }

    #[test]
    fn test_boosting_defaults_to_false() {
        let req = PositionUpdateRequest {
            add: Some(RawPoint::new(1.0, 2.0)),
            remove: Some(RawPoint::new(1.0, 3.0)),
            boosting: None,
        };
        assert!(!req.validate().unwrap().boosting);
    }
}
