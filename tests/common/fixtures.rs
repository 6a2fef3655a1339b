//! Hand-assembled class-file images for integration tests.
//!
//! The builder writes the physical layout directly: constant pool entries in
//! declaration order, then the declared type, fields, methods, and class
//! attributes. Names are given in internal slash form, exactly as a compiler
//! would emit them.
#![allow(dead_code)]

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

pub const RETURN: u8 = 0xb1;
pub const INVOKEVIRTUAL: u8 = 0xb6;

pub struct ClassFileBuilder {
    minor: u16,
    major: u16,
    pool: Vec<u8>,
    pool_slots: u16,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<u8>,
    field_count: u16,
    methods: Vec<u8>,
    method_count: u16,
}

impl ClassFileBuilder {
    /// Start a class file for `this_name extends super_name`, both in
    /// internal slash form.
    pub fn new(this_name: &str, super_name: &str) -> Self {
        let mut builder = Self {
            minor: 0,
            major: 61,
            pool: Vec::new(),
            pool_slots: 0,
            access_flags: ACC_PUBLIC,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            field_count: 0,
            methods: Vec::new(),
            method_count: 0,
        };
        builder.this_class = builder.class(this_name);
        builder.super_class = builder.class(super_name);
        builder
    }

    pub fn major(mut self, major: u16) -> Self {
        self.major = major;
        self
    }

    pub fn access_flags(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        self.pool.push(1);
        self.pool
            .extend_from_slice(&(text.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(text.as_bytes());
        self.pool_slots += 1;
        self.pool_slots
    }

    pub fn class(&mut self, internal_name: &str) -> u16 {
        let name_index = self.utf8(internal_name);
        self.pool.push(7);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        self.pool_slots += 1;
        self.pool_slots
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.pool.push(12);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        self.pool.extend_from_slice(&descriptor_index.to_be_bytes());
        self.pool_slots += 1;
        self.pool_slots
    }

    /// A Methodref for `owner.name(descriptor)`, owner in slash form.
    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(owner);
        let nat_index = self.name_and_type(name, descriptor);
        self.pool.push(10);
        self.pool.extend_from_slice(&class_index.to_be_bytes());
        self.pool.extend_from_slice(&nat_index.to_be_bytes());
        self.pool_slots += 1;
        self.pool_slots
    }

    pub fn add_interface(&mut self, internal_name: &str) {
        let index = self.class(internal_name);
        self.interfaces.push(index);
    }

    /// A field with no attributes.
    pub fn add_field(&mut self, flags: u16, name: &str, descriptor: &str) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.fields.extend_from_slice(&flags.to_be_bytes());
        self.fields.extend_from_slice(&name_index.to_be_bytes());
        self.fields
            .extend_from_slice(&descriptor_index.to_be_bytes());
        self.fields.extend_from_slice(&0u16.to_be_bytes());
        self.field_count += 1;
    }

    /// A method without a Code attribute (abstract or native shape).
    pub fn add_method(&mut self, flags: u16, name: &str, descriptor: &str) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.methods.extend_from_slice(&flags.to_be_bytes());
        self.methods.extend_from_slice(&name_index.to_be_bytes());
        self.methods
            .extend_from_slice(&descriptor_index.to_be_bytes());
        self.methods.extend_from_slice(&0u16.to_be_bytes());
        self.method_count += 1;
    }

    /// A method whose Code attribute carries the given bytecode.
    pub fn add_method_with_code(&mut self, flags: u16, name: &str, descriptor: &str, code: &[u8]) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let code_attr_name = self.utf8("Code");

        self.methods.extend_from_slice(&flags.to_be_bytes());
        self.methods.extend_from_slice(&name_index.to_be_bytes());
        self.methods
            .extend_from_slice(&descriptor_index.to_be_bytes());
        self.methods.extend_from_slice(&1u16.to_be_bytes());

        // max_stack, max_locals, code, empty exception table, no attributes
        let attr_len = 2 + 2 + 4 + code.len() + 2 + 2;
        self.methods.extend_from_slice(&code_attr_name.to_be_bytes());
        self.methods
            .extend_from_slice(&(attr_len as u32).to_be_bytes());
        self.methods.extend_from_slice(&4u16.to_be_bytes());
        self.methods.extend_from_slice(&4u16.to_be_bytes());
        self.methods
            .extend_from_slice(&(code.len() as u32).to_be_bytes());
        self.methods.extend_from_slice(code);
        self.methods.extend_from_slice(&0u16.to_be_bytes());
        self.methods.extend_from_slice(&0u16.to_be_bytes());
        self.method_count += 1;
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xcafe_babeu32.to_be_bytes());
        out.extend_from_slice(&self.minor.to_be_bytes());
        out.extend_from_slice(&self.major.to_be_bytes());
        out.extend_from_slice(&(self.pool_slots + 1).to_be_bytes());
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for index in &self.interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }
        out.extend_from_slice(&self.field_count.to_be_bytes());
        out.extend_from_slice(&self.fields);
        out.extend_from_slice(&self.method_count.to_be_bytes());
        out.extend_from_slice(&self.methods);
        // class attributes
        out.extend_from_slice(&0u16.to_be_bytes());
        out
    }
}

/// A minimal valid class: `public class <name> extends java.lang.Object`.
pub fn simple_class(internal_name: &str) -> Vec<u8> {
    ClassFileBuilder::new(internal_name, "java/lang/Object").build()
}

/// Bytecode for an invokevirtual of the given Methodref index followed by
/// a bare return.
pub fn call_and_return(method_ref: u16) -> Vec<u8> {
    let [high, low] = method_ref.to_be_bytes();
    vec![INVOKEVIRTUAL, high, low, RETURN]
}

/// A class whose `run()V` method calls each `(owner, method)` target once.
pub fn class_calling(internal_name: &str, targets: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = ClassFileBuilder::new(internal_name, "java/lang/Object");
    let mut code = Vec::new();
    for (owner, method) in targets {
        let method_ref = builder.method_ref(owner, method, "()V");
        let [high, low] = method_ref.to_be_bytes();
        code.extend_from_slice(&[INVOKEVIRTUAL, high, low]);
    }
    code.push(RETURN);
    builder.add_method_with_code(ACC_PUBLIC, "run", "()V", &code);
    builder.build()
}
