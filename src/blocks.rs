use log::debug;

/// A rectangular window of pixels, in raster pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWindow {
    pub x_off: usize,
    pub y_off: usize,
    pub width: usize,
    pub height: usize,
}

impl BlockWindow {
    pub fn offset(&self) -> (isize, isize) {
        (self.x_off as isize, self.y_off as isize)
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tiling of a raster into blocks, row-major; edge blocks are clipped.
#[derive(Debug, Clone)]
pub struct BlockGrid {
    raster_width: usize,
    raster_height: usize,
    block_width: usize,
    block_height: usize,
    pub num_blocks_x: usize,
    pub num_blocks_y: usize,
}

impl BlockGrid {
    pub fn new(raster_size: (usize, usize), block_size: (usize, usize)) -> Self {
        let (raster_width, raster_height) = raster_size;
        let block_width = block_size.0.max(1);
        let block_height = block_size.1.max(1);

        let num_blocks_x = raster_width.div_ceil(block_width);
        let num_blocks_y = raster_height.div_ceil(block_height);

        debug!(
            "BlockGrid: {}x{} raster, block {}x{} -> {}x{} blocks",
            raster_width, raster_height, block_width, block_height, num_blocks_x, num_blocks_y
        );

        Self {
            raster_width,
            raster_height,
            block_width,
            block_height,
            num_blocks_x,
            num_blocks_y,
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.num_blocks_x * self.num_blocks_y
    }

    pub fn window(&self, block_idx: usize) -> BlockWindow {
        let block_y = block_idx / self.num_blocks_x;
        let block_x = block_idx % self.num_blocks_x;

        let x_off = block_x * self.block_width;
        let y_off = block_y * self.block_height;

        BlockWindow {
            x_off,
            y_off,
            width: self.block_width.min(self.raster_width - x_off),
            height: self.block_height.min(self.raster_height - y_off),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = BlockWindow> + '_ {
        (0..self.total_blocks()).map(|idx| self.window(idx))
    }
}
