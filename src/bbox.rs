/// Axis-aligned extent in projected (or geographic) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self, String> {
        if ![xmin, ymin, xmax, ymax].iter().all(|v| v.is_finite()) {
            return Err("Bounding box coordinates must be finite".to_string());
        }

        if xmin > xmax || ymin > ymax {
            return Err("Min values must be <= max values".to_string());
        }

        Ok(BoundingBox {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    /// Extent covered by a `width` x `height` raster with the given geotransform.
    pub fn from_geo_transform(gt: &[f64; 6], width: usize, height: usize) -> Self {
        let x0 = gt[0];
        let x1 = gt[0] + gt[1] * width as f64 + gt[2] * height as f64;
        let y0 = gt[3];
        let y1 = gt[3] + gt[4] * width as f64 + gt[5] * height as f64;

        BoundingBox {
            xmin: x0.min(x1),
            ymin: y0.min(y1),
            xmax: x0.max(x1),
            ymax: y0.max(y1),
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// `None` when the boxes do not share any area.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let xmin = self.xmin.max(other.xmin);
        let ymin = self.ymin.max(other.ymin);
        let xmax = self.xmax.min(other.xmax);
        let ymax = self.ymax.min(other.ymax);

        if xmin >= xmax || ymin >= ymax {
            return None;
        }

        Some(BoundingBox {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    /// Shrinks or grows the right and bottom edges so the extent is a whole
    /// number of pixels, anchored at the upper-left corner.
    pub fn snap_to_pixel_size(&self, pixel_width: f64, pixel_height: f64) -> BoundingBox {
        let px = pixel_width.abs();
        let py = pixel_height.abs();

        let n_cols = (self.width() / px).round().max(1.0);
        let n_rows = (self.height() / py).round().max(1.0);

        BoundingBox {
            xmin: self.xmin,
            ymin: self.ymax - n_rows * py,
            xmax: self.xmin + n_cols * px,
            ymax: self.ymax,
        }
    }
}
