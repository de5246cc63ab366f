use fixed::types::I32F32;

// Backend coordinate, quantized to 1/1000 unit so recorded command streams
// compare stably across platforms.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pt(I32F32);

impl Pt {
    pub const ZERO: Pt = Pt(I32F32::from_bits(0));

    pub fn from_f64(value: f64) -> Pt {
        if !value.is_finite() {
            return Pt::ZERO;
        }
        let milli = (value * 1000.0).round();
        let milli = milli.clamp(i64::MIN as f64, i64::MAX as f64) as i64;
        Pt::from_milli_i64(milli)
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_num()
    }

    pub fn to_milli_i64(self) -> i64 {
        let bits = self.0.to_bits() as i128;
        let denom = 1i128 << 32;
        let scaled = bits * 1000;
        let adj = if scaled >= 0 { denom / 2 } else { -denom / 2 };
        let milli = (scaled + adj) / denom;
        milli.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    pub fn from_milli_i64(milli: i64) -> Pt {
        let denom = 1i128 << 32;
        let milli = milli as i128;
        let adj = if milli >= 0 { 500 } else { -500 };
        let bits = (milli * denom + adj) / 1000;
        let bits = bits.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        Pt(I32F32::from_bits(bits))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn midpoint(self, other: Point) -> Point {
        self.lerp(other, 0.5)
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        libm::sqrt(dx * dx + dy * dy)
    }

    // Reflection of `control` about `self`, used by the S/T shorthands.
    pub fn reflect(self, control: Point) -> Point {
        Point {
            x: 2.0 * self.x - control.x,
            y: 2.0 * self.y - control.y,
        }
    }
}

/// 2D affine map `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn rotate_degrees(deg: f64) -> Self {
        Self::rotate(deg.to_radians())
    }

    pub fn rotate(rad: f64) -> Self {
        let s = libm::sin(rad);
        let c = libm::cos(rad);
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Matrix product `self * other`: `other` applies first, then `self`.
    pub fn append(self, other: Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    pub fn apply_point(&self, p: Point) -> Point {
        let (x, y) = self.apply(p.x, p.y);
        Point { x, y }
    }

    pub fn scale_factor(&self) -> f64 {
        libm::sqrt(self.a * self.a + self.c * self.c)
    }

    // Geometric mean of the two axis scales; keeps stroke weight visually
    // uniform under non-uniform zoom.
    pub fn stroke_scale(&self) -> f64 {
        let sx = libm::sqrt(self.a * self.a + self.b * self.b);
        let sy = libm::sqrt(self.c * self.c + self.d * self.d);
        libm::sqrt(sx * sy)
    }

    pub fn is_axis_aligned(&self) -> bool {
        self.b == 0.0 && self.c == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Grow to cover `(x, y)`. A `None` accumulator becomes a zero-size
    /// rect at the point.
    pub fn include_point(acc: &mut Option<Rect>, x: f64, y: f64) {
        let Some(rect) = acc.as_mut() else {
            *acc = Some(Rect::new(x, y, 0.0, 0.0));
            return;
        };
        if x < rect.x {
            rect.width += rect.x - x;
            rect.x = x;
        }
        if x > rect.right() {
            rect.width = x - rect.x;
        }
        if y < rect.y {
            rect.height += rect.y - y;
            rect.y = y;
        }
        if y > rect.bottom() {
            rect.height = y - rect.y;
        }
    }
}

/// Packed 24-bit RGB, the representation used in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb24(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    pub fn to_rgb24(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Backend color with a byte alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub color: Color,
    pub alpha: u8,
}

impl Rgba {
    pub fn new(color: Color, alpha: f64) -> Self {
        let alpha = libm::ceil(alpha.clamp(0.0, 1.0) * 255.0) as u8;
        Self { color, alpha }
    }

    pub fn to_hex(self) -> String {
        format!("#{:06x}{:02x}", self.color.to_rgb24(), self.alpha)
    }
}

/// Nine-slice remap region: points inside `rect` stretch so that the region
/// becomes `width` x `height`; points beyond it shift by the difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRect {
    pub rect: Rect,
    pub width: f64,
    pub height: f64,
}

impl ScaleRect {
    pub fn new(rect: Rect, width: f64, height: f64) -> Self {
        Self {
            rect,
            width,
            height,
        }
    }

    pub fn remap(&self, x: f64, y: f64) -> (f64, f64) {
        (
            remap_axis(x, self.rect.x, self.rect.width, self.width),
            remap_axis(y, self.rect.y, self.rect.height, self.height),
        )
    }
}

fn remap_axis(v: f64, start: f64, extent: f64, target: f64) -> f64 {
    if v <= start {
        return v;
    }
    if v > start + extent {
        return v + target - extent;
    }
    if extent == 0.0 {
        return v;
    }
    start + target * (v - start) / extent
}
