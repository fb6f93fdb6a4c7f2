//! # Strideview
//!
//! Coordinated multi-view selection and rendering engine for comparing two
//! cohorts of gait trials.
//!
//! An analyst explores two named groups of trial records and time-normalized
//! traces across three linked chart views — box plots, a radar chart, and a
//! line chart with per-trial spaghetti — and cross-filters them: selecting a
//! value range in one chart highlights the same underlying trials in every
//! other chart.
//!
//! ## Architecture
//!
//! - **[`SelectionStore`](selection::SelectionStore)**: the single shared
//!   mutable resource, holding one deduplicated composite-key set per group
//!   with synchronous subscribe/notify semantics.
//! - **[`stats`]**: pure quantile, mean, and ensemble computations feeding
//!   every view.
//! - **[`BrushController`](brush::BrushController)**: maps pixel-space drags
//!   into selection updates, and repositions its handle programmatically
//!   without re-entering the update path.
//! - **Chart views** ([`views`]): each compiles `(dataset, selection, active
//!   flags, dimensions)` into a [`RenderDescription`](render::RenderDescription)
//!   from scratch on every input change.
//! - **[`Dashboard`](dashboard::Dashboard)**: one analysis session wiring the
//!   pieces together behind a single facade.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strideview::prelude::*;
//!
//! let mut dash = Dashboard::new();
//! dash.load_dataset(&payload_json)?;
//!
//! // A brush drag on the box plot...
//! dash.render_box_plot();
//! dash.brush(Group::One, BrushEvent::user(interval));
//!
//! // ...highlights the same trials everywhere
//! let frame = dash.render_all();
//! SvgEncoder::new().write_to_file(&frame.line_chart, "line.svg")?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and the two-cohort palette.
pub mod color;

/// Geometric primitives (points, rectangles, hit math).
pub mod geometry;

/// Scale functions for data-to-visual mappings.
pub mod scale;

/// Trial records, traces, and the form-payload boundary.
pub mod data;

/// Statistics computations feeding the views.
pub mod stats;

// ============================================================================
// Interaction Modules
// ============================================================================

/// Shared selection state with subscribe/notify semantics.
pub mod selection;

/// Brush-to-selection mapping with reentrancy-safe repositioning.
pub mod brush;

// ============================================================================
// View Modules
// ============================================================================

/// Deterministic render descriptions.
pub mod render;

/// Chart views (box plot, line chart, radar) and shared plumbing.
pub mod views;

/// Dashboard session facade.
pub mod dashboard;

/// Output encoders (SVG).
pub mod output;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for strideview operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use strideview::prelude::*;
/// ```
pub mod prelude {
    pub use crate::brush::{BrushController, BrushEvent, EventSource, PixelInterval};
    pub use crate::color::Rgba;
    pub use crate::dashboard::{Dashboard, DashboardFrame, ViewKind};
    pub use crate::data::{composite_key, Dataset, Group, SamplePoint, TrialRecord};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Point, Rect};
    pub use crate::output::SvgEncoder;
    pub use crate::render::{
        HitGeometry, HitRegion, Mark, RenderDescription, Shape, TextAnchor,
    };
    pub use crate::scale::{BandScale, LinearScale, Scale};
    pub use crate::selection::{SelectionStore, SubscriptionId};
    pub use crate::stats::{
        attribute_means, ensemble, quantile_summary, MeanBand, QuantileSummary,
    };
    pub use crate::views::{
        ActiveGroups, BoxPlotView, Crosshair, CrosshairReadout, Dimensions, DisplayMode,
        LineChartView, RadarView, ResizeAdapter,
    };
}

// ============================================================================
// Tests
// ============================================================================
