//! OpenEye toolkit modules and their license predicates.

use std::fmt;
use std::str::FromStr;

/// A licensed OpenEye toolkit module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OeModule {
    OEChem,
    OEOmega,
    OEQuacPac,
    OEIUPAC,
    OEDepict,
}

impl OeModule {
    /// Every supported toolkit module.
    pub const ALL: [OeModule; 5] = [
        OeModule::OEChem,
        OeModule::OEOmega,
        OeModule::OEQuacPac,
        OeModule::OEIUPAC,
        OeModule::OEDepict,
    ];

    /// Short module name, e.g. `oechem`.
    pub fn module_name(&self) -> &'static str {
        match self {
            OeModule::OEChem => "oechem",
            OeModule::OEOmega => "oeomega",
            OeModule::OEQuacPac => "oequacpac",
            OeModule::OEIUPAC => "oeiupac",
            OeModule::OEDepict => "oedepict",
        }
    }

    /// Full dotted path, e.g. `openeye.oechem`.
    pub fn module_path(&self) -> String {
        format!("openeye.{}", self.module_name())
    }

    /// Name of the predicate the module exports to report its license state.
    pub fn license_predicate(&self) -> &'static str {
        match self {
            OeModule::OEChem => "OEChemIsLicensed",
            OeModule::OEOmega => "OEOmegaIsLicensed",
            OeModule::OEQuacPac => "OEQuacPacIsLicensed",
            OeModule::OEIUPAC => "OEIUPACIsLicensed",
            OeModule::OEDepict => "OEDepictIsLicensed",
        }
    }
}

impl fmt::Display for OeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_name())
    }
}

impl FromStr for OeModule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("openeye.").unwrap_or(s);
        OeModule::ALL
            .into_iter()
            .find(|module| module.module_name() == name)
            .ok_or_else(|| format!("Unknown OpenEye module: {}", s))
    }
}
