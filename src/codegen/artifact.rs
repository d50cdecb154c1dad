//! In-memory generated artifacts
//!
//! Generators append named sections in emission order; the artifact is
//! serialized once, when it is written or compared.

/// Kind of generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Public interface (`.h`)
    Header,
    /// Implementation skeleton (`.c`)
    Source,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Header => "h",
            ArtifactKind::Source => "c",
        }
    }
}

/// One named block of generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: &'static str,
    pub body: String,
}

/// A generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub sections: Vec<Section>,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, file_stem: &str) -> Self {
        Self {
            kind,
            file_name: format!("{}.{}", file_stem, kind.extension()),
            sections: Vec::new(),
        }
    }

    /// Append a section; empty bodies are dropped
    pub fn push(&mut self, name: &'static str, body: String) {
        if !body.is_empty() {
            self.sections.push(Section { name, body });
        }
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_names(&self) -> Vec<&'static str> {
        self.sections.iter().map(|s| s.name).collect()
    }

    /// Concatenate every section
    pub fn render(&self) -> String {
        self.sections.iter().map(|s| s.body.as_str()).collect()
    }
}
