//! Test fixtures for typeflat testing
//!
//! Provides small, representative type graphs for each walk scenario, and a
//! temp-directory workspace (input tree + serialized program) for driver tests.

use std::fs;
use std::path::{Path, PathBuf};

use typeflat_core::graph::{NodeId, TypeGraph, TypeGraphBuilder};
use typeflat_core::{entry_points_of, TypeResolver};

/// Input root used by in-memory fixtures.
pub const DEFAULT_ROOT: &str = "/project/build/routes";

/// Fixture categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureType {
    /// `User` referencing a separately exported `Address`
    ScenarioA,
    /// Two unrelated `Config` types reached from one entry point
    ScenarioB,
    /// `type Id = string`
    ScenarioC,
    /// `interface three extends Hello3`
    Heritage,
    /// `interface two { [key: string]: Hello2 }`
    IndexSignature,
    /// `A` and `B` referencing each other
    Cycle,
    /// Two entry points reaching textually identical `Customer` copies
    SharedReference,
    /// `type Shape = Circle | Square`
    UnionAlias,
    /// Heritage target that is a call expression
    UnsupportedHeritage,
    /// Member type declared under `node_modules`
    ExcludedModule,
    /// Declaration the checker could not bind
    MissingSymbol,
    /// `type Json = string | Json[]`, recursive without a named declaration
    RecursiveUnion,
    /// One `Settings` symbol declared twice (declaration merging)
    MergedDeclaration,
}

impl FixtureType {
    pub const ALL: [FixtureType; 13] = [
        FixtureType::ScenarioA,
        FixtureType::ScenarioB,
        FixtureType::ScenarioC,
        FixtureType::Heritage,
        FixtureType::IndexSignature,
        FixtureType::Cycle,
        FixtureType::SharedReference,
        FixtureType::UnionAlias,
        FixtureType::UnsupportedHeritage,
        FixtureType::ExcludedModule,
        FixtureType::MissingSymbol,
        FixtureType::RecursiveUnion,
        FixtureType::MergedDeclaration,
    ];
}

/// A single-scenario graph plus the file and entry points to flatten.
pub struct Fixture {
    pub graph: TypeGraph,
    pub file: String,
    pub entry_points: Vec<NodeId>,
}

/// Build one scenario rooted at [`DEFAULT_ROOT`].
pub fn fixture(kind: FixtureType) -> Fixture {
    fixture_at(kind, DEFAULT_ROOT)
}

pub fn fixture_at(kind: FixtureType, root: &str) -> Fixture {
    let mut g = TypeGraphBuilder::new();
    let file = build_into(kind, &mut g, root);
    let graph = g.build().expect("fixture graphs are valid");
    let statements = graph
        .file(&file)
        .map(|f| f.statements.clone())
        .unwrap_or_default();
    let entry_points = entry_points_of(&graph, &statements);
    Fixture {
        graph,
        file,
        entry_points,
    }
}

/// Path of the scenario's entry file under `root`.
pub fn entry_file(kind: FixtureType, root: &str) -> String {
    let name = match kind {
        FixtureType::ScenarioA => "user.d.ts",
        FixtureType::ScenarioB => "route.d.ts",
        FixtureType::ScenarioC => "id.d.ts",
        FixtureType::Heritage => "three.d.ts",
        FixtureType::IndexSignature => "two.d.ts",
        FixtureType::Cycle => "cycle.d.ts",
        FixtureType::SharedReference => "billing.d.ts",
        FixtureType::UnionAlias => "shape.d.ts",
        FixtureType::UnsupportedHeritage => "widget.d.ts",
        FixtureType::ExcludedModule => "page.d.ts",
        FixtureType::MissingSymbol => "ghost.d.ts",
        FixtureType::RecursiveUnion => "json.d.ts",
        FixtureType::MergedDeclaration => "panel.d.ts",
    };
    format!("{}/{}", root, name)
}

/// Add a scenario's declarations and files to `g`. Returns the entry file.
///
/// Scenarios use disjoint file names, so several can share one builder.
pub fn build_into(kind: FixtureType, g: &mut TypeGraphBuilder, root: &str) -> String {
    let entry = entry_file(kind, root);
    let at = |name: &str| format!("{}/{}", root, name);
    let string = g.primitive("string");
    let number = g.primitive("number");
    let boolean = g.primitive("boolean");

    match kind {
        FixtureType::ScenarioA => {
            let address_ts = at("address.d.ts");
            let user = g.interface(
                "User",
                "export interface User {\n    id: string;\n    address: Address;\n}",
                &entry,
                true,
            );
            let address = g.interface(
                "Address",
                "export interface Address {\n    street: string;\n    city: string;\n}",
                &address_ts,
                true,
            );
            g.property(user.ty, "id", string);
            g.property(user.ty, "address", address.ty);
            g.property(address.ty, "street", string);
            g.property(address.ty, "city", string);
            g.file(&entry, &[user.node]);
            g.file(&address_ts, &[address.node]);
        }
        FixtureType::ScenarioB => {
            let client_ts = at("client.d.ts");
            let server_ts = at("server.d.ts");
            let route = g.interface(
                "Route",
                "export interface Route {\n    client: Client;\n    server: Server;\n}",
                &entry,
                true,
            );
            let client = g.interface(
                "Client",
                "export interface Client {\n    config: Config;\n}",
                &client_ts,
                true,
            );
            let client_config = g.interface(
                "Config",
                "export interface Config {\n    retries: number;\n}",
                &client_ts,
                true,
            );
            let server = g.interface(
                "Server",
                "export interface Server {\n    config: Config;\n}",
                &server_ts,
                true,
            );
            let server_config = g.interface(
                "Config",
                "interface Config {\n    port: number;\n    secure: boolean;\n}",
                &server_ts,
                false,
            );
            g.property(route.ty, "client", client.ty);
            g.property(route.ty, "server", server.ty);
            g.property(client.ty, "config", client_config.ty);
            g.property(client_config.ty, "retries", number);
            g.property(server.ty, "config", server_config.ty);
            g.property(server_config.ty, "port", number);
            g.property(server_config.ty, "secure", boolean);
            g.file(&entry, &[route.node]);
            g.file(&client_ts, &[client_config.node, client.node]);
            g.file(&server_ts, &[server_config.node, server.node]);
        }
        FixtureType::ScenarioC => {
            let id = g.type_alias("Id", "export type Id = string;", &entry, true, string);
            g.file(&entry, &[id.node]);
        }
        FixtureType::Heritage => {
            let hello = g.interface(
                "Hello3",
                "export interface Hello3 {\n    greeting: string;\n}",
                &entry,
                true,
            );
            let three = g.interface(
                "three",
                "export interface three extends Hello3 {\n    count: number;\n}",
                &entry,
                true,
            );
            g.property(hello.ty, "greeting", string);
            g.extends(three.ty, hello.ty);
            // Inherited members are visible through property enumeration too.
            g.property(three.ty, "count", number);
            g.property(three.ty, "greeting", string);
            g.file(&entry, &[three.node]);
        }
        FixtureType::IndexSignature => {
            let hello = g.interface(
                "Hello2",
                "export interface Hello2 {\n    value: number;\n}",
                &entry,
                true,
            );
            let two = g.interface(
                "two",
                "export interface two {\n    [key: string]: Hello2;\n}",
                &entry,
                true,
            );
            g.property(hello.ty, "value", number);
            g.index_signature(two.ty, hello.ty);
            g.file(&entry, &[two.node]);
        }
        FixtureType::Cycle => {
            let a = g.interface("A", "export interface A {\n    b: B;\n}", &entry, true);
            let b = g.interface("B", "export interface B {\n    a: A;\n}", &entry, true);
            g.property(a.ty, "b", b.ty);
            g.property(b.ty, "a", a.ty);
            g.file(&entry, &[a.node, b.node]);
        }
        FixtureType::SharedReference => {
            let orders_ts = at("shared/orders.d.ts");
            let invoices_ts = at("shared/invoices.d.ts");
            let customer_text = "export interface Customer {\n    name: string;\n}";
            let order = g.interface(
                "Order",
                "export interface Order {\n    customer: Customer;\n}",
                &entry,
                true,
            );
            let invoice = g.interface(
                "Invoice",
                "export interface Invoice {\n    customer: Customer;\n}",
                &entry,
                true,
            );
            let customer_a = g.interface("Customer", customer_text, &orders_ts, true);
            let customer_b = g.interface("Customer", customer_text, &invoices_ts, true);
            g.property(order.ty, "customer", customer_a.ty);
            g.property(invoice.ty, "customer", customer_b.ty);
            g.property(customer_a.ty, "name", string);
            g.property(customer_b.ty, "name", string);
            g.file(&entry, &[order.node, invoice.node]);
            g.file(&orders_ts, &[customer_a.node]);
            g.file(&invoices_ts, &[customer_b.node]);
        }
        FixtureType::UnionAlias => {
            let circle = g.interface(
                "Circle",
                "export interface Circle {\n    radius: number;\n}",
                &entry,
                true,
            );
            let square = g.interface(
                "Square",
                "export interface Square {\n    side: number;\n}",
                &entry,
                true,
            );
            g.property(circle.ty, "radius", number);
            g.property(square.ty, "side", number);
            let union = g.composite("Circle | Square", &[circle.ty, square.ty]);
            let shape = g.type_alias(
                "Shape",
                "export type Shape = Circle | Square;",
                &entry,
                true,
                union,
            );
            g.file(&entry, &[shape.node]);
        }
        FixtureType::UnsupportedHeritage => {
            let widget = g.interface(
                "Widget",
                "export interface Widget extends ReturnType<typeof mixin> {\n    id: string;\n}",
                &entry,
                true,
            );
            g.property(widget.ty, "id", string);
            g.extends_expression(widget.ty, "ReturnType<typeof mixin>");
            g.file(&entry, &[widget.node]);
        }
        FixtureType::ExcludedModule => {
            let vendor_ts = "/project/node_modules/@types/dom/index.d.ts";
            let page = g.interface(
                "Page",
                "export interface Page {\n    root: ElementLike;\n    meta: Meta;\n}",
                &entry,
                true,
            );
            let element = g.interface(
                "ElementLike",
                "export interface ElementLike {\n    tagName: string;\n}",
                vendor_ts,
                true,
            );
            let meta = g.interface(
                "Meta",
                "interface Meta {\n    title: string;\n}",
                &entry,
                false,
            );
            g.property(page.ty, "root", element.ty);
            g.property(page.ty, "meta", meta.ty);
            g.property(element.ty, "tagName", string);
            g.property(meta.ty, "title", string);
            g.file(&entry, &[page.node]);
        }
        FixtureType::MissingSymbol => {
            let ghost = g.unbound(
                typeflat_core::graph::NodeKind::Interface,
                "Ghost",
                "export interface Ghost {\n    id: string;\n}",
                &entry,
            );
            g.file(&entry, &[ghost]);
        }
        FixtureType::RecursiveUnion => {
            let union = g.composite("string | Json[]", &[string]);
            let array = g.composite("Json[]", &[union]);
            g.nest(union, array);
            let json = g.type_alias(
                "Json",
                "export type Json = string | Json[];",
                &entry,
                true,
                union,
            );
            let payload = g.interface(
                "Payload",
                "export interface Payload {\n    body: Json;\n}",
                &entry,
                true,
            );
            g.property(payload.ty, "body", union);
            g.file(&entry, &[payload.node, json.node]);
        }
        FixtureType::MergedDeclaration => {
            let settings_ts = at("settings.d.ts");
            let theme_ts = at("theme.d.ts");
            let panel = g.interface(
                "Panel",
                "export interface Panel {\n    settings: Settings;\n}",
                &entry,
                true,
            );
            let settings = g.interface(
                "Settings",
                "export interface Settings {\n    locale: string;\n}",
                &settings_ts,
                true,
            );
            let augmented = g.add_declaration(
                settings.symbol,
                typeflat_core::graph::NodeKind::Interface,
                "Settings",
                "export interface Settings {\n    theme: Theme;\n}",
                &settings_ts,
                true,
            );
            let theme = g.interface(
                "Theme",
                "export interface Theme {\n    dark: boolean;\n}",
                &theme_ts,
                true,
            );
            g.property(panel.ty, "settings", settings.ty);
            g.property(settings.ty, "locale", string);
            g.property(settings.ty, "theme", theme.ty);
            g.property(theme.ty, "dark", boolean);
            g.file(&entry, &[panel.node]);
            g.file(&settings_ts, &[settings.node, augmented]);
            g.file(&theme_ts, &[theme.node]);
        }
    }

    entry
}

/// A temp directory laid out like a build tree, with a serialized program.
pub struct FixtureWorkspace {
    _temp_dir: tempfile::TempDir,
    /// Directory containing everything below
    pub root: PathBuf,
    /// Root of the declaration files (`<root>/build/routes`)
    pub input_root: PathBuf,
    /// Serialized type graph (`<root>/program.json`)
    pub graph_path: PathBuf,
    /// The graph written to `graph_path`
    pub graph: TypeGraph,
}

impl FixtureWorkspace {
    /// Create a workspace holding the given scenarios in one program.
    ///
    /// Every file of the program under the input root is written with the text
    /// of its statements, and a stray `.map` file is added next to them.
    pub fn setup(kinds: &[FixtureType]) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        let input_root = root.join("build").join("routes");
        fs::create_dir_all(&input_root).unwrap();
        let input_root_str = input_root.to_string_lossy().into_owned();

        let mut g = TypeGraphBuilder::new();
        for kind in kinds {
            build_into(*kind, &mut g, &input_root_str);
        }
        let graph = g.build().unwrap();

        for file in graph.files() {
            let path = Path::new(&file.path);
            if !path.starts_with(&input_root) {
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            let body: Vec<String> = file
                .statements
                .iter()
                .map(|node| graph.text_of(node))
                .collect();
            fs::write(path, body.join("\n") + "\n").unwrap();
        }
        fs::write(input_root.join("route.d.ts.map"), "{}").unwrap();

        let graph_path = root.join("program.json");
        fs::write(&graph_path, graph.to_json_pretty().unwrap()).unwrap();

        Self {
            _temp_dir: temp_dir,
            root,
            input_root,
            graph_path,
            graph,
        }
    }

    /// Where the driver writes its output in tests.
    pub fn out_dir(&self) -> PathBuf {
        self.root.join("generated")
    }
}
