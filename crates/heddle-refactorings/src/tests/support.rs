//! Workspaces and helpers shared by the refactoring tests.

use std::collections::BTreeMap;

use heddle_config::EngineConfig;
use heddle_core::{
    DocumentPath, ElementHandle, InMemoryWorkspace, ParticipantArgument, Session, telemetry,
};
use tracing_subscriber::fmt::TestWriter;

use crate::contribution_registry;

/// Type `p.A` with a comment, a literal and a self reference, used from its
/// own package, from another package by qualified name and from an XML
/// configuration file.
pub(crate) const TYPE_A: &str = "package p;\n\n/** A is the base. */\npublic class A {\n  String label = \"A\";\n  A self() { return this; }\n}\n";
pub(crate) const USER: &str = "package p;\n\nclass User {\n  A a = new A();\n}\n";
pub(crate) const OTHER: &str = "package q;\n\nclass Other {\n  p.A a;\n}\n";
pub(crate) const REMOTE: &str = "package q;\n\nclass Remote {\n  A unrelated;\n}\n";
pub(crate) const BEANS: &str = "<bean class=\"p.A\"/>\n<bean class=\"p.AB\"/>\n";

/// Type `p.A` with field `count` and its accessors.
pub(crate) const FIELD_OWNER: &str = "package p;\n\npublic class A {\n  int count;\n  int getCount() { return count; }\n  void setCount(int value) { count = value; }\n}\n";
pub(crate) const FIELD_READER: &str = "package p;\n\nclass Reader {\n  int read(A a) { return a.count + a.getCount(); }\n}\n";

/// Type `p.A` declaring `m(int i, int j)`, called from `p.Caller`.
pub(crate) const METHOD_OWNER: &str = "package p;\n\npublic class A {\n  void m(int i, int j) {}\n}\n";
pub(crate) const CALLER: &str = "package p;\n\nclass Caller {\n  void run(int a, int b) { new A().m(a, b); }\n}\n";

pub(crate) fn type_workspace() -> InMemoryWorkspace {
    InMemoryWorkspace::with_documents([
        ("p/A.java", TYPE_A),
        ("p/User.java", USER),
        ("q/Other.java", OTHER),
        ("q/Remote.java", REMOTE),
        ("config/beans.xml", BEANS),
    ])
}

pub(crate) fn field_workspace() -> InMemoryWorkspace {
    InMemoryWorkspace::with_documents([("p/A.java", FIELD_OWNER), ("p/Reader.java", FIELD_READER)])
}

pub(crate) fn method_workspace() -> InMemoryWorkspace {
    InMemoryWorkspace::with_documents([("p/A.java", METHOD_OWNER), ("p/Caller.java", CALLER)])
}

/// A session over `store` with every contribution registered.
pub(crate) fn session(store: InMemoryWorkspace) -> Session<InMemoryWorkspace> {
    let logging = EngineConfig::default()
        .with_log_filter("warn,heddle_core=info,heddle_refactorings=debug");
    telemetry::initialise_with(&logging, TestWriter::new()).expect("test telemetry installs");
    Session::new(store, EngineConfig::default())
        .with_contributions(contribution_registry().expect("contribution ids are distinct"))
}

pub(crate) fn snapshot(session: &Session<InMemoryWorkspace>) -> BTreeMap<DocumentPath, String> {
    session.store().documents().clone()
}

pub(crate) fn doc(path: &str) -> DocumentPath {
    DocumentPath::new(path)
}

pub(crate) fn handles(raw: &[&str]) -> Vec<ElementHandle> {
    raw.iter().map(|handle| ElementHandle::new(*handle)).collect()
}

pub(crate) fn rename(new_name: &str) -> ParticipantArgument {
    ParticipantArgument::rename(new_name)
}
