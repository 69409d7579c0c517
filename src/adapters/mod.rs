//! Input adapters.
//!
//! - [`population`] - population JSON documents (providers and persons)
//!
//! Adapters convert external documents into the domain model; the exporter
//! itself never touches the file format of its input.
//!
//! ```rust,no_run
//! use cdw_export::adapters::population::load_population;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let population = load_population("population.json")?;
//! println!("{} persons", population.len());
//! # Ok(())
//! # }
//! ```

pub mod population;

pub use population::{load_population, Population};
