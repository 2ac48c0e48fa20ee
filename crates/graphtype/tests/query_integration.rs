//! Integration tests for query execution.
//!
//! These tests verify the complete flow from synthesized types through the
//! assembled schema to an in-memory data source and back.

mod common;

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use async_graphql::{Request, Variables};
use common::{ACME_ID, Empresa, EmpresaFilter, EmpresaSource, GLOBEX_ID, IdFilter, OfflineSource};
use graphtype::{
    BoxedValue, ConfigScope, FieldDescriptor, GraphTypeConfig, Reflect, RootQueryField,
    SchemaAssembler, SchemaBuilderConfig, TypeDescriptor, TypeProvider,
};
use serde_json::json;

// =============================================================================
// Test Helpers
// =============================================================================

fn build_schema(provider: Arc<TypeProvider>, config: SchemaBuilderConfig) -> Schema {
    let source = Arc::new(EmpresaSource::new());

    let empresas = RootQueryField::new::<Vec<Empresa>>(&provider, "empresas", source.clone())
        .unwrap()
        .argument::<Option<IdFilter>>(&provider, "idFilter")
        .unwrap()
        .argument::<Option<EmpresaFilter>>(&provider, "filter")
        .unwrap()
        .description("Registered companies");

    let empresa = RootQueryField::new::<Option<Empresa>>(&provider, "empresa", source)
        .unwrap()
        .argument::<IdFilter>(&provider, "idFilter")
        .unwrap();

    let offline = RootQueryField::new::<Vec<Empresa>>(&provider, "offline", Arc::new(OfflineSource))
        .unwrap();

    SchemaAssembler::new(provider, config)
        .description("Company registry")
        .field(empresas)
        .field(empresa)
        .field(offline)
        .build()
        .expect("schema should build")
}

fn default_schema() -> Schema {
    build_schema(Arc::new(TypeProvider::new()), SchemaBuilderConfig::default())
}

async fn execute(schema: &Schema, request: impl Into<Request>) -> serde_json::Value {
    let response = schema.execute(request).await;
    assert!(
        response.errors.is_empty(),
        "Query should succeed: {:?}",
        response.errors
    );
    response.data.into_json().expect("Should have data")
}

// =============================================================================
// Schema Tests
// =============================================================================

#[tokio::test]
async fn test_schema_has_synthesized_types() {
    let sdl = default_schema().sdl();

    assert!(sdl.contains("type empresa"), "Should have empresa object");
    assert!(sdl.contains("type loja"), "Should have loja object");
    assert!(sdl.contains("type endereco"), "Should have endereco object");
    assert!(sdl.contains("input idfilterInput"), "Should have input filter");
    assert!(sdl.contains("input empresafilterInput"));
    assert!(sdl.contains("enum situacao"), "Should have situacao enum");
    assert!(sdl.contains("scalar UUID"), "Should register UUID scalar");
    assert!(sdl.contains("scalar Date"), "Should register Date scalar");
    assert!(sdl.contains("razaosocial: String!"));
    assert!(sdl.contains("numero: Int"));
}

// =============================================================================
// Query Execution Tests
// =============================================================================

#[tokio::test]
async fn test_list_query_resolves_nested_objects() {
    let schema = default_schema();
    let query = r#"
        query {
            empresas {
                id
                nome
                razaosocial
                fundacao
                lojas {
                    nome
                    telefone
                    situacao
                    endereco { cidade numero }
                }
            }
        }
    "#;

    let data = execute(&schema, query).await;
    let empresas = data["empresas"].as_array().expect("list of empresas");
    assert_eq!(empresas.len(), 2);

    let acme = &empresas[0];
    assert_eq!(acme["id"], ACME_ID);
    assert_eq!(acme["razaosocial"], "Acme Comercio Ltda");
    assert_eq!(acme["fundacao"], "2001-05-17");
    assert_eq!(acme["lojas"][0]["endereco"]["cidade"], "Sao Paulo");
    assert_eq!(acme["lojas"][0]["endereco"]["numero"], 1000);
    assert_eq!(acme["lojas"][0]["situacao"], "Ativa");
    assert!(acme["lojas"][1]["telefone"].is_null());
    assert!(acme["lojas"][1]["endereco"]["numero"].is_null());

    assert_eq!(empresas[1]["lojas"], json!([]));
}

#[tokio::test]
async fn test_input_object_argument() {
    let schema = default_schema();
    let query = format!(r#"{{ empresas(idFilter: {{ id: "{GLOBEX_ID}" }}) {{ nome }} }}"#);

    let data = execute(&schema, query).await;
    assert_eq!(data, json!({"empresas": [{"nome": "Globex"}]}));
}

#[tokio::test]
async fn test_enum_argument_with_variables() {
    let schema = default_schema();
    let query = r#"
        query Filtered($filter: empresafilterInput) {
            empresas(filter: $filter) { nome }
        }
    "#;
    let request = Request::new(query)
        .variables(Variables::from_json(json!({"filter": {"situacao": "Inativa"}})));

    let data = execute(&schema, request).await;
    assert_eq!(data, json!({"empresas": [{"nome": "Acme"}]}));
}

#[tokio::test]
async fn test_single_root_field() {
    let schema = default_schema();

    let query = format!(r#"{{ empresa(idFilter: {{ id: "{ACME_ID}" }}) {{ nome }} }}"#);
    let data = execute(&schema, query).await;
    assert_eq!(data["empresa"]["nome"], "Acme");

    let missing = r#"{ empresa(idFilter: { id: "00000000-0000-0000-0000-000000000000" }) { nome } }"#;
    let data = execute(&schema, missing).await;
    assert!(data["empresa"].is_null(), "Should return null for not found");
}

#[tokio::test]
async fn test_data_source_error_carries_code() {
    let schema = default_schema();
    let response = schema.execute("{ offline { nome } }").await;

    assert_eq!(response.errors.len(), 1);
    let error = &response.errors[0];
    assert!(error.message.contains("database offline"));
    let code = error
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .cloned();
    assert_eq!(
        code,
        Some(async_graphql::Value::String("SOURCE_ERROR".to_string()))
    );
}

#[tokio::test]
async fn test_configured_names_and_computed_fields() {
    let provider = Arc::new(TypeProvider::new());
    provider
        .register_configuration::<Empresa, _>(ConfigScope::Object, |editor| {
            editor
                .set_name("Company")
                .rename_field("RazaoSocial", "legalName")
                .add_computed::<Empresa, i32, _>("storeCount", |e: &Empresa| {
                    e.lojas.len() as i32
                })
                .add_computed::<Empresa, Option<String>, _>("firstStore", |e: &Empresa| {
                    e.lojas.first().map(|loja| loja.nome.clone())
                });
        })
        .unwrap();

    let schema = build_schema(provider, SchemaBuilderConfig::default());
    let sdl = schema.sdl();
    assert!(sdl.contains("type Company"));
    assert!(sdl.contains("storeCount: Int!"));
    assert!(sdl.contains("firstStore: String"));
    assert!(!sdl.contains("firstStore: String!"));

    let data = execute(&schema, "{ empresas { legalName storeCount } }").await;
    assert_eq!(
        data,
        json!({"empresas": [
            {"legalName": "Acme Comercio Ltda", "storeCount": 2},
            {"legalName": "Globex Industria SA", "storeCount": 0}
        ]})
    );

    let response = schema.execute("{ empresas { razaosocial } }").await;
    assert!(!response.errors.is_empty(), "Old name should be gone");
}

// =============================================================================
// Non-finite Values
// =============================================================================

#[derive(Clone)]
struct Medicao {
    valor: f64,
    leituras: Vec<f64>,
    ajuste: Option<f64>,
}

impl Reflect for Medicao {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::composite::<Self>("Medicao", || {
            vec![
                FieldDescriptor::new("Valor", |m: &Medicao| &m.valor),
                FieldDescriptor::new("Leituras", |m: &Medicao| &m.leituras),
                FieldDescriptor::new("Ajuste", |m: &Medicao| &m.ajuste),
            ]
        })
    }

    fn to_boxed(&self) -> BoxedValue {
        BoxedValue::object(self.clone())
    }
}

struct MedicaoSource;

#[async_trait::async_trait]
impl graphtype::DataSource for MedicaoSource {
    async fn fetch(
        &self,
        _args: &graphtype::QueryArguments,
    ) -> Result<Vec<graphtype::Instance>, graphtype::GraphTypeError> {
        Ok(vec![graphtype::Instance::new(Medicao {
            valor: f64::NAN,
            leituras: vec![1.5, f64::INFINITY],
            ajuste: Some(f64::NAN),
        })])
    }
}

fn medicao_schema() -> Schema {
    let provider = Arc::new(TypeProvider::new());
    let medicoes =
        RootQueryField::new::<Vec<Medicao>>(&provider, "medicoes", Arc::new(MedicaoSource))
            .unwrap();
    SchemaAssembler::new(provider, SchemaBuilderConfig::default())
        .field(medicoes)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_non_finite_float_on_non_null_field_is_a_field_error() {
    let schema = medicao_schema();

    let response = schema.execute("{ medicoes { valor } }").await;
    assert_eq!(response.errors.len(), 1);
    assert!(
        response.errors[0]
            .message
            .contains("Field Medicao.Valor is non-null but produced no representable value"),
        "unexpected message: {}",
        response.errors[0].message
    );

    let response = schema.execute("{ medicoes { leituras } }").await;
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].message.contains("Medicao.Leituras"));

    let data = execute(&schema, "{ medicoes { ajuste } }").await;
    assert_eq!(data, json!({"medicoes": [{"ajuste": null}]}));
}

// =============================================================================
// Limits and Configuration
// =============================================================================

#[derive(Clone)]
struct Category {
    name: String,
    children: Vec<Category>,
}

impl Reflect for Category {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::composite::<Self>("Category", || {
            vec![
                FieldDescriptor::new("Name", |c: &Category| &c.name),
                FieldDescriptor::new("Children", |c: &Category| &c.children),
            ]
        })
    }

    fn to_boxed(&self) -> BoxedValue {
        BoxedValue::object(self.clone())
    }
}

struct CategorySource;

#[async_trait::async_trait]
impl graphtype::DataSource for CategorySource {
    async fn fetch(
        &self,
        _args: &graphtype::QueryArguments,
    ) -> Result<Vec<graphtype::Instance>, graphtype::GraphTypeError> {
        let leaf = Category {
            name: "leaf".to_string(),
            children: Vec::new(),
        };
        let root = Category {
            name: "root".to_string(),
            children: vec![Category {
                name: "branch".to_string(),
                children: vec![leaf],
            }],
        };
        Ok(vec![graphtype::Instance::new(root)])
    }
}

fn category_schema(config: SchemaBuilderConfig) -> Schema {
    let provider = Arc::new(TypeProvider::new());
    let categories =
        RootQueryField::new::<Vec<Category>>(&provider, "categories", Arc::new(CategorySource))
            .unwrap();
    SchemaAssembler::new(provider, config)
        .field(categories)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_recursive_type_query() {
    let schema = category_schema(SchemaBuilderConfig::default());
    let data = execute(
        &schema,
        "{ categories { name children { name children { name } } } }",
    )
    .await;
    assert_eq!(data["categories"][0]["children"][0]["children"][0]["name"], "leaf");
}

#[tokio::test]
async fn test_depth_limit_from_config() {
    let config: GraphTypeConfig = toml::from_str("max_depth = 3").unwrap();
    config.validate().unwrap();
    let schema = category_schema(config.to_schema_builder_config());

    let response = schema
        .execute("{ categories { children { children { name } } } }")
        .await;
    assert!(!response.errors.is_empty(), "Depth limit should reject query");

    let data = execute(&schema, "{ categories { name } }").await;
    assert_eq!(data["categories"][0]["name"], "root");
}

#[tokio::test]
async fn test_custom_root_and_suffix() {
    let config = GraphTypeConfig {
        query_type_name: "Registry".to_string(),
        input_type_suffix: "Args".to_string(),
        ..Default::default()
    };
    let schema = build_schema(
        Arc::new(TypeProvider::new()),
        config.to_schema_builder_config(),
    );
    let sdl = schema.sdl();

    assert!(sdl.contains("type Registry"));
    assert!(sdl.contains("input idfilterArgs"));

    let data = execute(&schema, "{ empresas(filter: { nome: \"Acme\" }) { nome } }").await;
    assert_eq!(data, json!({"empresas": [{"nome": "Acme"}]}));
}
