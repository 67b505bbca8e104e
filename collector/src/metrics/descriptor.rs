use std::fmt;

/// Top-level namespace of every exported metric.
pub const NAMESPACE: &str = "tailscale";

/// Identity and shape of one metric family.
///
/// The label names are fixed for the lifetime of the descriptor. Samples must supply exactly one
/// value per label name, in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    fq_name: String,
    help: &'static str,
    label_names: &'static [&'static str],
}

/// Builds the descriptor `<namespace>_<subsystem>_<name>`. Empty parts are skipped, so an empty
/// subsystem yields `<namespace>_<name>`.
pub fn describe(
    subsystem: &str,
    name: &str,
    help: &'static str,
    label_names: &'static [&'static str],
) -> Descriptor {
    let fq_name = [NAMESPACE, subsystem, name]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    Descriptor {
        fq_name,
        help,
        label_names,
    }
}

impl Descriptor {
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &'static str {
        self.help
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        self.label_names
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.fq_name, self.label_names.join(","))
    }
}
