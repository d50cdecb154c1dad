//! Analysis and rendering of whole services

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::codegen::{Artifact, ArtifactGenerator, ArtifactKind, HeaderGenerator, SourceGenerator};
use crate::config;
use crate::error::{GenError, SpecError};
use crate::output;
use crate::model::ServiceSpec;
use crate::semantic::{AnalyzedService, ServiceAnalyzer};

/// Both artifacts of one service
#[derive(Debug, Clone)]
pub struct GeneratedService {
    pub analyzed: AnalyzedService,
    pub header: Artifact,
    pub source: Artifact,
}

impl GeneratedService {
    pub fn artifacts(&self) -> [&Artifact; 2] {
        [&self.header, &self.source]
    }
}

/// Analyze one service without rendering anything
pub fn analyze(spec: &ServiceSpec) -> Result<AnalyzedService, GenError> {
    Ok(ServiceAnalyzer::new().analyze(spec)?)
}

/// Analyze one service and render both artifacts
pub fn generate(spec: &ServiceSpec) -> Result<GeneratedService, GenError> {
    let analyzed = analyze(spec)?;

    debug!("rendering {}", analyzed.file_stem);
    let header = HeaderGenerator::new().generate(&analyzed)?;
    let source = SourceGenerator::new().generate(&analyzed)?;

    info!(
        "generated {} and {} for service {}",
        header.file_name, source.file_name, spec.name
    );

    Ok(GeneratedService {
        analyzed,
        header,
        source,
    })
}

/// Artifact kinds to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub header: bool,
    pub source: bool,
}

impl Selection {
    pub const ALL: Selection = Selection {
        header: true,
        source: true,
    };

    pub fn includes(self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Header => self.header,
            ArtifactKind::Source => self.source,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::ALL
    }
}

/// Load every configuration file into one list, in argument order
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ServiceSpec>, GenError> {
    let mut specs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        info!("Processing: {}", path.display());
        specs.extend(config::load(path)?);
    }
    Ok(specs)
}

/// Two services must not map onto the same output files
fn check_outputs(specs: &[ServiceSpec]) -> Result<(), SpecError> {
    let mut stems = HashSet::new();
    for spec in specs {
        let stem = spec.file_stem();
        if !stems.insert(stem.to_lowercase()) {
            return Err(SpecError::DuplicateOutput { filename: stem });
        }
    }
    Ok(())
}

/// Analyze every service without rendering. Fails where `generate_all`
/// would.
pub fn check_all(specs: &[ServiceSpec]) -> Result<Vec<AnalyzedService>, GenError> {
    check_outputs(specs)?;
    specs.iter().map(analyze).collect()
}

/// Generate every service. Fails on the first error, before anything is
/// handed to the caller for writing.
pub fn generate_all(specs: &[ServiceSpec]) -> Result<Vec<GeneratedService>, GenError> {
    check_outputs(specs)?;
    specs.iter().map(generate).collect()
}

/// Generate every service, then write the selected artifacts into `dir`.
/// Nothing is written unless every service generated.
pub fn generate_into(specs: &[ServiceSpec], dir: &Path, selection: Selection) -> Result<Vec<PathBuf>, GenError> {
    let generated = generate_all(specs)?;
    let artifacts = generated
        .iter()
        .flat_map(|service| service.artifacts())
        .filter(|artifact| selection.includes(artifact.kind));
    Ok(output::write_artifacts(dir, artifacts)?)
}
