//! intersector: section a solid model with a plane
//!
//! This library holds the thin workflow behind the `intersector` command:
//! load a shape, cut it with a plane given in point-normal form, check that
//! the cut produced edges, export them and show the result.
//!
//! # Architecture
//!
//! All geometry is delegated to a [`backend::GeometryBackend`]. The workflow
//! owns no geometric state, so any engine can be plugged in and tests can
//! substitute a fake:
//!
//! - **Plane parsing**: `"x,y,z:nx,ny,nz"` into a point and a normal
//! - **Workflow**: load → parse → section → validate → export → display
//! - **Backend**: shape I/O, section primitive, edge enumeration, viewer
//!
//! # Modules
//!
//! - [`backend`] — Geometry backend trait and the triangle-mesh backend
//! - [`cli`] — Command-line surface
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`plane`] — Plane definition parsing
//! - [`workflow`] — Intersection workflow and validity check

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod plane;
pub mod workflow;
