use crate::error::InvariantError;

fn finite(axis: &'static str, value: f64) -> Result<f64, InvariantError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvariantError::NonFiniteCoordinate { axis, value })
    }
}

/// A canvas coordinate. Both components are always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Result<Self, InvariantError> {
        Ok(Self {
            x: finite("x", x)?,
            y: finite("y", y)?,
        })
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_x(&mut self, x: f64) -> Result<(), InvariantError> {
        self.x = finite("x", x)?;
        Ok(())
    }

    pub fn set_y(&mut self, y: f64) -> Result<(), InvariantError> {
        self.y = finite("y", y)?;
        Ok(())
    }

    /// Move by an offset, leaving the point untouched if the result is not finite.
    pub fn translate(&mut self, dx: f64, dy: f64) -> Result<(), InvariantError> {
        let moved = Self::new(self.x + dx, self.y + dy)?;
        *self = moved;
        Ok(())
    }
}

/// Width and height of a component or system frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    width: f64,
    height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Result<Self, InvariantError> {
        Ok(Self {
            width: finite("width", width)?,
            height: finite("height", height)?,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_width(&mut self, width: f64) -> Result<(), InvariantError> {
        self.width = finite("width", width)?;
        Ok(())
    }

    pub fn set_height(&mut self, height: f64) -> Result<(), InvariantError> {
        self.height = finite("height", height)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_rejects_non_finite() {
        assert!(Point::new(1.0, 2.0).is_ok());
        assert!(matches!(
            Point::new(f64::NAN, 0.0),
            Err(InvariantError::NonFiniteCoordinate { axis: "x", .. })
        ));
        assert!(matches!(
            Point::new(0.0, f64::INFINITY),
            Err(InvariantError::NonFiniteCoordinate { axis: "y", .. })
        ));
    }

    #[test]
    fn test_setters_keep_previous_value_on_error() {
        let mut p = Point::new(140.0, 100.0).unwrap();
        assert!(p.set_x(f64::NAN).is_err());
        assert_eq!(p.x(), 140.0);

        p.set_y(-10.0).unwrap();
        assert_eq!(p.y(), -10.0);

        assert!(p.translate(f64::INFINITY, 0.0).is_err());
        assert_eq!(p, Point::new(140.0, -10.0).unwrap());

        p.translate(10.0, 10.0).unwrap();
        assert_eq!(p, Point::new(150.0, 0.0).unwrap());
    }

    #[test]
    fn test_dimensions() {
        let mut d = Dimensions::new(450.0, 600.0).unwrap();
        assert!(d.set_width(f64::NEG_INFINITY).is_err());
        assert_eq!(d.width(), 450.0);
        d.set_height(300.0).unwrap();
        assert_eq!(d.height(), 300.0);
    }
}
