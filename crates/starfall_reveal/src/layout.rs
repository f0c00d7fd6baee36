//! Horizontal slot layout.
//!
//! The row spans `spread_fraction` of the viewport, centred, then shifted
//! left by `left_bias`. The first element's left edge sits at the start of
//! the row and the last element's right edge at its end:
//!
//! ```text
//! total   = W * spread_fraction
//! usable  = max(total - element_width, 0)
//! spacing = usable / (N - 1)          (0 when N == 1)
//! leading = (W - total) / 2 - left_bias
//! slot i  = leading + spacing * i
//! ```

use starfall_core::{RevealConfig, StarfallError, StarfallResult};

/// One element position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealSlot {
    /// Position in the reveal order.
    pub index: usize,
    /// Horizontal offset in px from the viewport's left edge.
    pub offset: f32,
}

/// The full slot sequence for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealLayout {
    slots: Vec<RevealSlot>,
    spacing: f32,
    leading: f32,
}

impl RevealLayout {
    /// Computes the layout for a viewport `viewport_width` px wide.
    ///
    /// # Errors
    ///
    /// Returns [`StarfallError::InvalidLayout`] for a zero count, a
    /// non-finite or negative width, or a spread fraction outside `(0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(viewport_width: f32, config: &RevealConfig) -> StarfallResult<Self> {
        let count = config.count;
        if count == 0 {
            return Err(StarfallError::InvalidLayout("slot count is zero".into()));
        }
        if !viewport_width.is_finite() || viewport_width < 0.0 {
            return Err(StarfallError::InvalidLayout(format!(
                "viewport width {viewport_width} is not a usable width"
            )));
        }
        let fraction = config.spread_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(StarfallError::InvalidLayout(format!(
                "spread fraction {fraction} outside (0, 1]"
            )));
        }

        let total = viewport_width * fraction;
        // A row narrower than one element stacks every slot at the start.
        let usable = (total - config.element_width).max(0.0);
        let spacing = if count > 1 {
            usable / (count - 1) as f32
        } else {
            0.0
        };
        let leading = (viewport_width - total) / 2.0 - config.left_bias;

        let slots = (0..count)
            .map(|index| RevealSlot {
                index,
                offset: leading + spacing * index as f32,
            })
            .collect();

        Ok(Self {
            slots,
            spacing,
            leading,
        })
    }

    /// Every slot, in reveal order.
    #[must_use]
    pub fn slots(&self) -> &[RevealSlot] {
        &self.slots
    }

    /// Slot `index`, if it exists.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<RevealSlot> {
        self.slots.get(index).copied()
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true before the first computation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Distance between consecutive slots.
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Offset of slot 0.
    #[must_use]
    pub const fn leading(&self) -> f32 {
        self.leading
    }
}
