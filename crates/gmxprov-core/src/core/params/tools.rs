use super::schema::{ChainRoles, FlagSpec, ToolSchema};
use phf::{Map, phf_map};

static PDB2GMX_FLAGS: &[FlagSpec] = &[
    FlagSpec::input("f", "pdbfile", "Input structure file").with_default("conf.gro"),
    FlagSpec::option("ff", "Forcefield").required(),
    FlagSpec::option("water", "Water model").required(),
    FlagSpec::option(
        "chainsep",
        "Condition in PDB files when a new chain should be started: id_or_ter, id_and_ter, ter, id, interactive",
    ),
    FlagSpec::option("merge", "Merge multiple chains into a single [moleculetype]: no, all, interactive"),
    FlagSpec::switch("inter", "Set the next 8 options to interactive"),
    FlagSpec::switch("ss", "Interactive SS bridge selection"),
    FlagSpec::switch("ter", "Interactive termini selection, instead of charged"),
    FlagSpec::switch("lys", "Interactive lysine selection, instead of charged"),
    FlagSpec::switch("arg", "Interactive arginine selection, instead of charged"),
    FlagSpec::switch("asp", "Interactive aspartic acid selection, instead of charged"),
    FlagSpec::switch("glu", "Interactive glutamic acid selection, instead of charged"),
    FlagSpec::switch("gln", "Interactive glutamine selection, instead of charged"),
    FlagSpec::switch("his", "Interactive histidine selection, instead of checking H-bonds"),
    FlagSpec::option("angle", "Minimum hydrogen-donor-acceptor angle for a H-bond (degrees)"),
    FlagSpec::option("dist", "Maximum donor-acceptor distance for a H-bond (nm)"),
    FlagSpec::switch("una", "Select aromatic rings with united CH atoms"),
    FlagSpec::switch("ignh", "Ignore hydrogen atoms that are in the coordinate file"),
    FlagSpec::switch("missing", "Continue when atoms are missing and bonds cannot be made"),
    FlagSpec::switch("v", "Be slightly more verbose in messages"),
    FlagSpec::option("posrefc", "Force constant for position restraints"),
    FlagSpec::option("vsite", "Convert atoms to virtual sites: none, hydrogens, aromatics"),
    FlagSpec::switch("heavyh", "Make hydrogen atoms heavy"),
    FlagSpec::switch("deuterate", "Change the mass of hydrogens to 2 amu"),
    FlagSpec::switch("chargegrp", "Use charge groups in the .rtp file"),
    FlagSpec::switch("cmap", "Use cmap torsions (if enabled in the .rtp file)"),
    FlagSpec::switch("renum", "Renumber the residues consecutively in the output"),
    FlagSpec::switch("rtpres", "Use .rtp entry names as residue names"),
    FlagSpec::output("o", "grofile", "Output structure file").with_default("out.gro"),
    FlagSpec::output("p", "topfile", "Output topology file").with_default("out.gro"),
    FlagSpec::output("i", "itpfile", "Output itp file").with_default("out.gro"),
    FlagSpec::output("n", "n_file", "Output index file").with_default("out.gro"),
    FlagSpec::output("q", "q_file", "Output structure file").with_default("out.gro"),
];

static GROMPP_FLAGS: &[FlagSpec] = &[
    FlagSpec::input("f", "mdpfile", "Input parameter file").with_default("grompp.mdp"),
    FlagSpec::input("c", "grofile", "Input structure file").required(),
    FlagSpec::input("r", "r_file", "Restraint structure file"),
    FlagSpec::input("rb", "rb_file", "Restraint B-state structure file"),
    FlagSpec::input("n", "n_file", "Index file"),
    FlagSpec::input("p", "topfile", "Topology file").with_default("topol.top"),
    FlagSpec::input("t", "t_file", "Full precision trajectory: trr cpt tng"),
    FlagSpec::input("e", "e_file", "Energy file"),
    FlagSpec::input("qmi", "qmi_file", "Input file for QM program"),
    FlagSpec::input("ref", "ref_file", "Full precision trajectory: trr cpt tng"),
    FlagSpec::switch("v", "Be loud and noisy"),
    FlagSpec::option("time", "Take frame at or first after this time"),
    FlagSpec::switch("rmvsbds", "Remove constant bonded interactions with virtual sites"),
    FlagSpec::option("maxwarn", "Number of allowed warnings during input processing"),
    FlagSpec::switch(
        "zero",
        "Set parameters for bonded interactions without defaults to zero instead of generating an error",
    ),
    FlagSpec::switch("renum", "Renumber atomtypes and minimize number of atomtypes"),
    FlagSpec::output("o", "tprfile", "Output run input file").with_default("conf.gro"),
    FlagSpec::output("po", "po_file", "grompp input file with MD parameters"),
    FlagSpec::output("pp", "pp_file", "Topology file"),
    FlagSpec::output("imd", "imd_file", "Coordinate file in Gromos-87 format"),
];

static MDRUN_FLAGS: &[FlagSpec] = &[
    FlagSpec::input("s", "tprfile", "Portable xdr run input file").with_default("topol.tpr"),
    FlagSpec::input("cpi", "cpi_file", "Checkpoint file"),
    FlagSpec::input("table", "table_file", "xvgr/xmgr file"),
    FlagSpec::input("tablep", "tablep_file", "xvgr/xmgr file"),
    FlagSpec::input("tableb", "tableb_file", "xvgr/xmgr file"),
    FlagSpec::input("rerun", "rerun_file", "Trajectory: xtc trr cpt gro g96 pdb tng"),
    FlagSpec::input("ei", "ei_file", "ED sampling input"),
    FlagSpec::input("multidir", "multidir_file", "Run directory"),
    FlagSpec::input("awh", "awh_file", "xvgr/xmgr file"),
    FlagSpec::input("membed", "membed_file", "Generic data file"),
    FlagSpec::input("mp", "mp_file", "Topology file"),
    FlagSpec::input("mn", "mn_file", "Index file"),
    FlagSpec::option("xvg", "xvg plot formatting: xmgrace, xmgr, none"),
    FlagSpec::vector("dd", "Domain decomposition grid, 0 is optimize"),
    FlagSpec::option("ddorder", "DD rank order: interleave, pp_pme, cartesian"),
    FlagSpec::option("npme", "Number of separate ranks to be used for PME, -1 is guess"),
    FlagSpec::option("nt", "Total number of threads to start (0 is guess)"),
    FlagSpec::option("ntmpi", "Number of thread-MPI ranks to start (0 is guess)"),
    FlagSpec::option("ntomp", "Number of OpenMP threads per MPI rank to start (0 is guess)"),
    FlagSpec::option("ntomp_pme", "Number of OpenMP threads per MPI rank to start (0 is -ntomp)"),
    FlagSpec::option("pin", "Whether mdrun should try to set thread affinities: auto, on, off"),
    FlagSpec::option("pinoffset", "The lowest logical core number to which mdrun should pin the first thread"),
    FlagSpec::option("pinstride", "Pinning distance in logical cores for threads"),
    FlagSpec::option("gpu_id", "List of unique GPU device IDs available to use"),
    FlagSpec::option("gputasks", "List of GPU device IDs, mapping each PP task on each node to a device"),
    FlagSpec::switch("ddcheck", "Check for all bonded interactions with DD"),
    FlagSpec::option("rdd", "The maximum distance for bonded interactions with DD (nm)"),
    FlagSpec::option("rcon", "Maximum distance for P-LINCS (nm), 0 is estimate"),
    FlagSpec::option("dlb", "Dynamic load balancing (with DD): auto, no, yes"),
    FlagSpec::option("dds", "Fraction in (0,1) by whose reciprocal the initial DD cell size will be increased"),
    FlagSpec::option("nb", "Calculate non-bonded interactions on: auto, cpu, gpu"),
    FlagSpec::option("nstlist", "Set nstlist when using a Verlet buffer tolerance (0 is guess)"),
    FlagSpec::switch("tunepme", "Optimize PME load between PP/PME ranks or GPU/CPU"),
    FlagSpec::option("pme", "Perform PME calculations on: auto, cpu, gpu"),
    FlagSpec::option("pmefft", "Perform PME FFT calculations on: auto, cpu, gpu"),
    FlagSpec::option("bonded", "Perform bonded calculations on: auto, cpu, gpu"),
    FlagSpec::option("update", "Perform update and constraints on: auto, cpu, gpu"),
    FlagSpec::switch("v", "Be loud and noisy"),
    FlagSpec::option("pforce", "Print all forces larger than this (kJ/mol nm)"),
    FlagSpec::switch("reprod", "Try to avoid optimizations that affect binary reproducibility"),
    FlagSpec::option("cpt", "Checkpoint interval (minutes)"),
    FlagSpec::switch("cpnum", "Keep and number checkpoint files"),
    FlagSpec::switch("append", "Append to previous output files when continuing from checkpoint"),
    FlagSpec::option("nsteps", "Run this number of steps (-1 means infinite, -2 means use mdp option)"),
    FlagSpec::option("maxh", "Terminate after 0.99 times this time (hours)"),
    FlagSpec::option("replex", "Attempt replica exchange periodically with this period (steps)"),
    FlagSpec::option("nex", "Number of random exchanges to carry out each exchange interval"),
    FlagSpec::option("reseed", "Seed for replica exchange, -1 is generate a seed"),
    FlagSpec::output("c", "grofile", "Structure file").with_default("confout.gro"),
    FlagSpec::output("e", "enfile", "Energy file").with_default("ener.edr"),
    FlagSpec::output("g", "logfile", "MD log file").with_default("md.log"),
    FlagSpec::output("o", "trrfile", "Trajectory output file"),
    FlagSpec::output("x", "x_file", "Compressed trajectory (tng format or portable xdr format)"),
    FlagSpec::output("cpo", "cpo_file", "Checkpoint file"),
    FlagSpec::output("dhdl", "dhdl_file", "xvgr/xmgr file"),
    FlagSpec::output("field", "field_file", "xvgr/xmgr file"),
    FlagSpec::output("tpi", "tpi_file", "xvgr/xmgr file"),
    FlagSpec::output("tpid", "tpid_file", "xvgr/xmgr file"),
    FlagSpec::output("eo", "eo_file", "xvgr/xmgr file"),
    FlagSpec::output("px", "px_file", "xvgr/xmgr file"),
    FlagSpec::output("pf", "pf_file", "xvgr/xmgr file"),
    FlagSpec::output("ro", "ro_file", "xvgr/xmgr file"),
    FlagSpec::output("ra", "ra_file", "Log file"),
    FlagSpec::output("rs", "rs_file", "Log file"),
    FlagSpec::output("rt", "rt_file", "Log file"),
    FlagSpec::output("mtx", "mtx_file", "Hessian matrix"),
    FlagSpec::output("if", "if_file", "xvgr/xmgr file"),
    FlagSpec::output("swap", "swap_file", "xvgr/xmgr file"),
];

static EDITCONF_FLAGS: &[FlagSpec] = &[
    FlagSpec::input("f", "grofile", "Input structure file").required(),
    FlagSpec::input("n", "n_file", "Index file"),
    FlagSpec::input("bf", "bf_file", "Generic data file"),
    FlagSpec::switch("ndef", "Choose output from default index groups"),
    FlagSpec::option("bt", "Box type for -box and -d: triclinic, cubic, dodecahedron, octahedron"),
    FlagSpec::vector("box", "Box vector lengths (a,b,c)"),
    FlagSpec::vector("angles", "Angles between the box vectors (bc,ac,ab)"),
    FlagSpec::option("d", "Distance between the solute and the box"),
    FlagSpec::switch("c", "Center molecule in box (implied by -box and -d)"),
    FlagSpec::vector("center", "Shift the geometrical center to (x,y,z)"),
    FlagSpec::vector("aligncenter", "Center of rotation for alignment"),
    FlagSpec::vector("align", "Align to target vector"),
    FlagSpec::vector("translate", "Translation"),
    FlagSpec::vector("rotate", "Rotation around the X, Y and Z axes in degrees"),
    FlagSpec::switch("princ", "Orient molecule(s) along their principal axes"),
    FlagSpec::vector("scale", "Scaling factor"),
    FlagSpec::option("density", "Density (g/L) of the output box achieved by scaling"),
    FlagSpec::switch("pbc", "Remove the periodicity (make molecule whole again)"),
    FlagSpec::option("resnr", "Renumber residues starting from resnr"),
    FlagSpec::switch("grasp", "Store the charge of the atom in the B-factor field"),
    FlagSpec::option("rvdw", "Default Van der Waals radius (in nm)"),
    FlagSpec::switch("sig56", "Use rmin/2 (minimum in the Van der Waals potential) rather than sigma/2"),
    FlagSpec::switch("vdwread", "Read the Van der Waals radii from the file vdwradii.dat"),
    FlagSpec::switch("atom", "Force B-factor attachment per atom"),
    FlagSpec::switch("legend", "Make B-factor legend"),
    FlagSpec::option("label", "Add chain label for all residues"),
    FlagSpec::switch("conect", "Add CONECT records to a .pdb file when written"),
    FlagSpec::output("o", "grofile", "Output structure file").required(),
    FlagSpec::output("mead", "mead_file", "Coordinate file for MEAD"),
];

pub static PDB2GMX: ToolSchema = ToolSchema {
    name: "pdb2gmx",
    flags: PDB2GMX_FLAGS,
    chain_roles: ChainRoles::None,
    include_role: None,
};

pub static GROMPP: ToolSchema = ToolSchema {
    name: "grompp",
    flags: GROMPP_FLAGS,
    chain_roles: ChainRoles::Only(&["grofile", "topfile", "mdpfile"]),
    include_role: Some("topfile"),
};

pub static MDRUN: ToolSchema = ToolSchema {
    name: "mdrun",
    flags: MDRUN_FLAGS,
    chain_roles: ChainRoles::Only(&["tprfile", "cpi_file"]),
    include_role: None,
};

pub static EDITCONF: ToolSchema = ToolSchema {
    name: "editconf",
    flags: EDITCONF_FLAGS,
    chain_roles: ChainRoles::Only(&["grofile"]),
    include_role: None,
};

static TOOLS: Map<&'static str, &'static ToolSchema> = phf_map! {
    "pdb2gmx" => &PDB2GMX,
    "grompp" => &GROMPP,
    "mdrun" => &MDRUN,
    "editconf" => &EDITCONF,
};

/// Looks up a wrapped GROMACS subcommand by name.
pub fn lookup(name: &str) -> Option<&'static ToolSchema> {
    TOOLS.get(name).copied()
}

pub fn all() -> [&'static ToolSchema; 4] {
    [&PDB2GMX, &GROMPP, &MDRUN, &EDITCONF]
}
