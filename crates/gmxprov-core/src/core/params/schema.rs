/// What a command-line flag means to the job: an input file, an output file,
/// or a plain option passed through to the executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRole {
    /// The flag names a file that must be staged into the working directory.
    /// The payload is the logical input role (e.g. `"pdbfile"`).
    Input(&'static str),
    /// The flag names a file the executable writes. The payload is the label
    /// the retrieved file is bound to (e.g. `"grofile"`).
    Output(&'static str),
    /// Any other option.
    Option,
}

/// How many command-line tokens a flag's value occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `-flag value`
    Single,
    /// `-flag` or `-noflag`, GROMACS boolean convention.
    Switch,
    /// `-flag v1 v2 ...`, e.g. box vectors.
    Vector,
}

/// One entry in a tool's flag whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: &'static str,
    pub role: FlagRole,
    pub kind: ValueKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub help: &'static str,
}

impl FlagSpec {
    pub const fn input(name: &'static str, role: &'static str, help: &'static str) -> Self {
        Self {
            name,
            role: FlagRole::Input(role),
            kind: ValueKind::Single,
            required: false,
            default: None,
            help,
        }
    }

    pub const fn output(name: &'static str, label: &'static str, help: &'static str) -> Self {
        Self {
            name,
            role: FlagRole::Output(label),
            kind: ValueKind::Single,
            required: false,
            default: None,
            help,
        }
    }

    pub const fn option(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            role: FlagRole::Option,
            kind: ValueKind::Single,
            required: false,
            default: None,
            help,
        }
    }

    pub const fn switch(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            role: FlagRole::Option,
            kind: ValueKind::Switch,
            required: false,
            default: None,
            help,
        }
    }

    pub const fn vector(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            role: FlagRole::Option,
            kind: ValueKind::Vector,
            required: false,
            default: None,
            help,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn with_default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub fn input_role(&self) -> Option<&'static str> {
        match self.role {
            FlagRole::Input(role) => Some(role),
            _ => None,
        }
    }

    pub fn output_label(&self) -> Option<&'static str> {
        match self.role {
            FlagRole::Output(label) => Some(label),
            _ => None,
        }
    }
}

/// Which staged inputs may be replaced by outputs of earlier jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRoles {
    None,
    All,
    Only(&'static [&'static str]),
}

impl ChainRoles {
    pub fn allows(&self, role: &str) -> bool {
        match self {
            ChainRoles::None => false,
            ChainRoles::All => true,
            ChainRoles::Only(roles) => roles.contains(&role),
        }
    }
}

/// The declarative description of one wrapped GROMACS subcommand.
#[derive(Debug)]
pub struct ToolSchema {
    pub name: &'static str,
    pub flags: &'static [FlagSpec],
    pub chain_roles: ChainRoles,
    /// Input role whose file is scanned for `#include "*.itp"` lines.
    pub include_role: Option<&'static str>,
}

impl ToolSchema {
    pub fn flag(&self, name: &str) -> Option<&'static FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &'static FlagSpec> {
        self.flags
            .iter()
            .filter(|f| matches!(f.role, FlagRole::Input(_)))
    }

    pub fn outputs(&self) -> impl Iterator<Item = &'static FlagSpec> {
        self.flags
            .iter()
            .filter(|f| matches!(f.role, FlagRole::Output(_)))
    }

    pub fn options(&self) -> impl Iterator<Item = &'static FlagSpec> {
        self.flags.iter().filter(|f| f.role == FlagRole::Option)
    }

    /// Process type recorded in the provenance store, e.g. `gromacs.grompp`.
    pub fn job_type(&self) -> String {
        format!("gromacs.{}", self.name)
    }

    pub fn parser_name(&self) -> String {
        self.job_type()
    }

    pub fn stdout_name(&self) -> String {
        format!("{}.out", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FLAGS: [FlagSpec; 3] = [
        FlagSpec::input("f", "pdbfile", "Input structure"),
        FlagSpec::option("ff", "Forcefield").required(),
        FlagSpec::output("o", "grofile", "Output structure").with_default("out.gro"),
    ];

    static SCHEMA: ToolSchema = ToolSchema {
        name: "demo",
        flags: &FLAGS,
        chain_roles: ChainRoles::Only(&["pdbfile"]),
        include_role: None,
    };

    #[test]
    fn const_builders_set_requirement_and_default() {
        assert!(FLAGS[1].required);
        assert_eq!(FLAGS[2].default, Some("out.gro"));
        assert!(!FLAGS[0].required);
    }

    #[test]
    fn role_accessors_distinguish_inputs_and_outputs() {
        assert_eq!(FLAGS[0].input_role(), Some("pdbfile"));
        assert_eq!(FLAGS[0].output_label(), None);
        assert_eq!(FLAGS[2].output_label(), Some("grofile"));
    }

    #[test]
    fn schema_partitions_flags_by_role() {
        assert_eq!(SCHEMA.inputs().count(), 1);
        assert_eq!(SCHEMA.outputs().count(), 1);
        assert_eq!(SCHEMA.options().map(|f| f.name).collect::<Vec<_>>(), ["ff"]);
        assert!(SCHEMA.flag("water").is_none());
    }

    #[test]
    fn derived_names_follow_tool_name() {
        assert_eq!(SCHEMA.job_type(), "gromacs.demo");
        assert_eq!(SCHEMA.stdout_name(), "demo.out");
    }

    #[test]
    fn chain_roles_filter_by_role_name() {
        assert!(SCHEMA.chain_roles.allows("pdbfile"));
        assert!(!SCHEMA.chain_roles.allows("topfile"));
        assert!(ChainRoles::All.allows("anything"));
        assert!(!ChainRoles::None.allows("pdbfile"));
    }
}
