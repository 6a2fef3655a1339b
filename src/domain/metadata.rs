//! Metadata model for decoded class files.
//!
//! Everything here is assembled once by the decoder and never mutated
//! afterwards. The graph builder consumes these values read-only.

use std::collections::BTreeMap;

use serde::Serialize;

/// Declared category of a type, derived from access flags and attributes.
///
/// Exactly one category is assigned per class, decided by a fixed precedence:
/// annotation, interface, enum, record, abstract class, ordinary class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassCategory {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
    AbstractClass,
}

impl ClassCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassCategory::Class => "class",
            ClassCategory::Interface => "interface",
            ClassCategory::Enum => "enum",
            ClassCategory::Annotation => "annotation",
            ClassCategory::Record => "record",
            ClassCategory::AbstractClass => "abstract_class",
        }
    }
}

/// Class file format version with its release label ("17", "22", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
    pub label: String,
}

/// A constant default value attached to a statically initialized field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// One value inside an annotation's attribute map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// Enum reference rendered as `EnumTypeFQN.CONSTANT`.
    EnumConst(String),
    /// Class literal, rendered as a dotted FQN.
    ClassRef(String),
    Nested(AnnotationInfo),
    Array(Vec<AnnotationValue>),
}

/// A decoded annotation: type name plus attribute name -> value map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationInfo {
    pub name: String,
    pub values: BTreeMap<String, AnnotationValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub type_name: String,
    /// Generic signature, when the compiler emitted one.
    pub signature: Option<String>,
    pub modifiers: Vec<String>,
    pub is_static: bool,
    pub is_final: bool,
    pub is_volatile: bool,
    pub is_transient: bool,
    pub constant: Option<ConstantValue>,
    pub annotations: Vec<AnnotationInfo>,
}

/// A method parameter. Names default to positional `arg{i}` placeholders and
/// are upgraded in place when a debug local-variable table entry maps to the
/// right slot; `name_recovered` tells the two apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub index: usize,
    pub type_name: String,
    pub name: String,
    pub name_recovered: bool,
}

/// One outgoing call site. Produced once per invoke instruction; the graph
/// builder is responsible for deduplication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    pub owner: String,
    pub method: String,
    pub descriptor: String,
    /// Source line, -1 when no line table was present.
    pub line: i32,
}

/// Fixed category for every instruction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstructionCategory {
    Push,
    Load,
    Store,
    LoadConstant,
    Increment,
    Arithmetic,
    Bitwise,
    Comparison,
    Conversion,
    Stack,
    Array,
    Field,
    Invoke,
    DynamicInvoke,
    Jump,
    Switch,
    Return,
    Throw,
    ExceptionRange,
    TypeOp,
    Monitor,
    Label,
    NoOp,
    Other,
}

/// One decoded instruction, created strictly in stream order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionRecord {
    pub index: usize,
    /// Source line, -1 when unknown.
    pub line: i32,
    pub category: InstructionCategory,
    pub description: String,
}

/// A control-flow edge between two bytecode offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    pub from: u32,
    pub to: u32,
}

/// Per-method counters accumulated during the instruction walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstructionStats {
    pub jump_count: u32,
    pub invoke_count: u32,
    pub field_access_count: u32,
    pub load_store_count: u32,
    /// `jump_count + 1`; a relative complexity signal, not an exact
    /// control-flow-graph decomposition.
    pub estimated_complexity: u32,
    pub flow_edges: Vec<FlowEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<ParameterInfo>,
    pub modifiers: Vec<String>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_synchronized: bool,
    pub is_native: bool,
    pub exceptions: Vec<String>,
    pub annotations: Vec<AnnotationInfo>,
    pub invocations: Vec<Invocation>,
    pub instructions: Vec<InstructionRecord>,
    pub stats: InstructionStats,
    pub descriptor: String,
}

impl MethodInfo {
    /// Constructors and static initializers keep their reserved JVM names.
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == "<clinit>"
    }
}

/// A fully decoded class file. The FQN is derived once at decode time and is
/// the unique key for every graph view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub simple_name: String,
    pub package: String,
    pub category: ClassCategory,
    /// Absent only for the root object type.
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub modifiers: Vec<String>,
    pub annotations: Vec<AnnotationInfo>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub version: ClassVersion,
}

impl ClassInfo {
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}
