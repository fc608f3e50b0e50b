//! Dense three-axis numeric container
//!
//! Array variables decode into a [`NumericCube`]: width (x) by height (y) by
//! depth (z) values of f64, stored flat with z varying fastest. Each depth
//! slice keeps a running (min, max) over every value written to it.

use std::fmt;
use std::str::FromStr;

use crate::error::SavError;

/// Dense x/y/z cube of f64 with per-depth statistics
#[derive(Debug, Clone, PartialEq)]
pub struct NumericCube {
    width: usize,
    height: usize,
    depth: usize,
    data: Vec<f64>,
    stats: Vec<(f64, f64)>,
}

/// Selection along one cube axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRange {
    /// A single index
    Index(i64),
    /// An inclusive `min..=max` span
    Span(i64, i64),
}

impl AxisRange {
    fn bounds(self) -> (i64, i64) {
        match self {
            Self::Index(i) => (i, i),
            Self::Span(min, max) => (min, max),
        }
    }
}

impl FromStr for AxisRange {
    type Err = SavError;

    /// Parse `"3"` or `"0:2"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SavError::BadRangeSyntax(s.to_string());
        match s.split_once(':') {
            Some((min, max)) => {
                let min = min.trim().parse().map_err(|_| bad())?;
                let max = max.trim().parse().map_err(|_| bad())?;
                Ok(Self::Span(min, max))
            }
            None => Ok(Self::Index(s.trim().parse().map_err(|_| bad())?)),
        }
    }
}

impl From<usize> for AxisRange {
    fn from(i: usize) -> Self {
        Self::Index(i as i64)
    }
}

impl From<std::ops::RangeInclusive<usize>> for AxisRange {
    fn from(r: std::ops::RangeInclusive<usize>) -> Self {
        Self::Span(*r.start() as i64, *r.end() as i64)
    }
}

impl NumericCube {
    /// Zero-filled cube; every depth reports `(+inf, -inf)` until written.
    ///
    /// The extents must already be validated: their product has to fit in
    /// `usize`. The array decoder checks this before building a cube.
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            data: vec![0.0; width * height * depth],
            stats: vec![(f64::INFINITY, f64::NEG_INFINITY); depth],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// `(width, height, depth)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Flat storage, index `x*height*depth + y*depth + z`
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Result<f64, SavError> {
        let idx = self.index(x, y, z)?;
        Ok(self.data[idx])
    }

    /// Write a value and fold it into the statistics of its depth
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: f64) -> Result<(), SavError> {
        let idx = self.index(x, y, z)?;
        self.data[idx] = value;
        let (min, max) = &mut self.stats[z];
        *min = min.min(value);
        *max = max.max(value);
        Ok(())
    }

    /// `(min, max)` of the values written at depth `z`
    pub fn stats(&self, z: usize) -> Result<(f64, f64), SavError> {
        self.stats
            .get(z)
            .copied()
            .ok_or_else(|| out_of_range('z', z as i64, z as i64, self.depth))
    }

    /// Statistics of every depth, indexed by z
    pub fn all_stats(&self) -> &[(f64, f64)] {
        &self.stats
    }

    /// Copy a rectangular region into a new cube.
    ///
    /// Spans are inclusive. Bounds are checked on every axis before anything
    /// is allocated.
    pub fn sub_cube(
        &self,
        x: impl Into<AxisRange>,
        y: impl Into<AxisRange>,
        z: impl Into<AxisRange>,
    ) -> Result<NumericCube, SavError> {
        let (x0, x1) = check_axis('x', x.into(), self.width)?;
        let (y0, y1) = check_axis('y', y.into(), self.height)?;
        let (z0, z1) = check_axis('z', z.into(), self.depth)?;

        let mut sub = NumericCube::new(x1 - x0 + 1, y1 - y0 + 1, z1 - z0 + 1);
        for z in 0..sub.depth {
            for y in 0..sub.height {
                for x in 0..sub.width {
                    let value = self.data[self.flat(x + x0, y + y0, z + z0)];
                    sub.set(x, y, z, value)?;
                }
            }
        }
        Ok(sub)
    }

    /// [`sub_cube`](Self::sub_cube) with textual ranges such as `"0:2"` or `"1"`
    pub fn sub_cube_str(&self, x: &str, y: &str, z: &str) -> Result<NumericCube, SavError> {
        self.sub_cube(
            x.parse::<AxisRange>()?,
            y.parse::<AxisRange>()?,
            z.parse::<AxisRange>()?,
        )
    }

    /// Values along x at fixed (y, z)
    pub fn vector_along_x(&self, y: usize, z: usize) -> Result<Vec<f64>, SavError> {
        self.index(0, y, z)?;
        Ok((0..self.width).map(|x| self.data[self.flat(x, y, z)]).collect())
    }

    /// Values along y at fixed (x, z)
    pub fn vector_along_y(&self, x: usize, z: usize) -> Result<Vec<f64>, SavError> {
        self.index(x, 0, z)?;
        Ok((0..self.height).map(|y| self.data[self.flat(x, y, z)]).collect())
    }

    /// Values along z at fixed (x, y)
    pub fn vector_along_z(&self, x: usize, y: usize) -> Result<Vec<f64>, SavError> {
        self.index(x, y, 0)?;
        Ok((0..self.depth).map(|z| self.data[self.flat(x, y, z)]).collect())
    }

    /// The x/y plane at depth `z`
    pub fn plane_xy(&self, z: usize) -> Result<Plane, SavError> {
        self.index(0, 0, z)?;
        let mut data = vec![0.0; self.width * self.height];
        for x in 0..self.width {
            for y in 0..self.height {
                data[x * self.height + y] = self.data[self.flat(x, y, z)];
            }
        }
        Ok(Plane::new(data, (self.width, self.height), (self.height, 1)))
    }

    /// The x/z plane at row `y`
    pub fn plane_xz(&self, y: usize) -> Result<Plane, SavError> {
        self.index(0, y, 0)?;
        let mut data = vec![0.0; self.width * self.depth];
        for x in 0..self.width {
            for z in 0..self.depth {
                data[z * self.width + x] = self.data[self.flat(x, y, z)];
            }
        }
        Ok(Plane::new(data, (self.width, self.depth), (1, self.width)))
    }

    /// The y/z plane at column `x`
    pub fn plane_yz(&self, x: usize) -> Result<Plane, SavError> {
        self.index(x, 0, 0)?;
        let mut data = vec![0.0; self.height * self.depth];
        for y in 0..self.height {
            for z in 0..self.depth {
                data[y * self.depth + z] = self.data[self.flat(x, y, z)];
            }
        }
        Ok(Plane::new(data, (self.height, self.depth), (self.depth, 1)))
    }

    fn flat(&self, x: usize, y: usize, z: usize) -> usize {
        x * self.height * self.depth + y * self.depth + z
    }

    fn index(&self, x: usize, y: usize, z: usize) -> Result<usize, SavError> {
        if x >= self.width {
            return Err(out_of_range('x', x as i64, x as i64, self.width));
        }
        if y >= self.height {
            return Err(out_of_range('y', y as i64, y as i64, self.height));
        }
        if z >= self.depth {
            return Err(out_of_range('z', z as i64, z as i64, self.depth));
        }
        Ok(self.flat(x, y, z))
    }
}

fn out_of_range(axis: char, min: i64, max: i64, extent: usize) -> SavError {
    SavError::OutOfRange {
        axis,
        min,
        max,
        extent,
    }
}

fn check_axis(axis: char, range: AxisRange, extent: usize) -> Result<(usize, usize), SavError> {
    let (min, max) = range.bounds();
    if min < 0 || max < min || max >= extent as i64 {
        return Err(out_of_range(axis, min, max, extent));
    }
    Ok((min as usize, max as usize))
}

/// A 2-D slice copied out of a cube.
///
/// Each plane keeps the flat layout it was extracted with; use [`Plane::get`]
/// rather than indexing [`Plane::data`] directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    data: Vec<f64>,
    extents: (usize, usize),
    strides: (usize, usize),
}

impl Plane {
    fn new(data: Vec<f64>, extents: (usize, usize), strides: (usize, usize)) -> Self {
        Self {
            data,
            extents,
            strides,
        }
    }

    /// Value at in-plane coordinates, in the axis order of the extraction
    /// (`plane_xy`: (x, y), `plane_xz`: (x, z), `plane_yz`: (y, z))
    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        if a >= self.extents.0 || b >= self.extents.1 {
            return None;
        }
        self.data.get(a * self.strides.0 + b * self.strides.1).copied()
    }

    /// Extents along the two in-plane axes
    pub fn extents(&self) -> (usize, usize) {
        self.extents
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// Axes longer than this are shown as head ... tail
const ELIDE_ABOVE: usize = 6;
const ELIDE_KEEP: usize = 3;

fn shown(n: usize) -> Vec<Option<usize>> {
    if n <= ELIDE_ABOVE {
        return (0..n).map(Some).collect();
    }
    let mut idx: Vec<Option<usize>> = (0..ELIDE_KEEP).map(Some).collect();
    idx.push(None);
    idx.extend((n - ELIDE_KEEP..n).map(Some));
    idx
}

impl NumericCube {
    fn fmt_row(&self, f: &mut fmt::Formatter<'_>, y: usize, z: usize) -> fmt::Result {
        if self.width > 1 {
            write!(f, "[")?;
        }
        for (i, x) in shown(self.width).into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match x {
                Some(x) => write!(f, "{:.8}", self.data[self.flat(x, y, z)])?,
                None => write!(f, "...")?,
            }
        }
        if self.width > 1 {
            write!(f, "]")?;
        }
        Ok(())
    }

    fn fmt_plane(&self, f: &mut fmt::Formatter<'_>, z: usize) -> fmt::Result {
        if self.height > 1 {
            write!(f, "[")?;
        }
        for (i, y) in shown(self.height).into_iter().enumerate() {
            if i > 0 {
                write!(f, ",\n       ")?;
            }
            match y {
                Some(y) => self.fmt_row(f, y, z)?,
                None => write!(f, "...")?,
            }
        }
        if self.height > 1 {
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl fmt::Display for NumericCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array(")?;
        if self.depth > 1 {
            write!(f, "[")?;
        }
        for z in 0..self.depth {
            if z > 0 {
                write!(f, ",\n\n       ")?;
            }
            self.fmt_plane(f, z)?;
        }
        if self.depth > 1 {
            write!(f, "]")?;
        }
        write!(f, ")")
    }
}
