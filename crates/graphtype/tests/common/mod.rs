//! Shared domain model for integration tests.
//!
//! A small company registry: companies (`Empresa`) own stores (`Loja`), each
//! with an address (`Endereco`).

#![allow(dead_code)]

use async_trait::async_trait;
use graphtype::{
    BoxedValue, DataSource, FieldDescriptor, GraphTypeError, Instance, QueryArguments, Reflect,
    TypeDescriptor,
};
use serde::Deserialize;
use time::Date;
use time::macros::date;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Situacao {
    Ativa,
    Inativa,
}

graphtype::reflect_enum!(Situacao { Ativa, Inativa });

#[derive(Debug, Clone)]
pub struct Endereco {
    pub cep: String,
    pub cidade: String,
    pub bairro: String,
    pub logradouro: String,
    pub numero: Option<i32>,
}

impl Reflect for Endereco {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::composite::<Self>("Endereco", || {
            vec![
                FieldDescriptor::new("Cep", |e: &Endereco| &e.cep),
                FieldDescriptor::new("Cidade", |e: &Endereco| &e.cidade),
                FieldDescriptor::new("Bairro", |e: &Endereco| &e.bairro),
                FieldDescriptor::new("Logradouro", |e: &Endereco| &e.logradouro),
                FieldDescriptor::new("Numero", |e: &Endereco| &e.numero),
            ]
        })
    }

    fn to_boxed(&self) -> BoxedValue {
        BoxedValue::object(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Loja {
    pub id: Uuid,
    pub nome: String,
    pub cnpj: String,
    pub endereco: Endereco,
    pub telefone: Option<String>,
    pub situacao: Situacao,
}

impl Reflect for Loja {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::composite::<Self>("Loja", || {
            vec![
                FieldDescriptor::new("Id", |l: &Loja| &l.id),
                FieldDescriptor::new("Nome", |l: &Loja| &l.nome),
                FieldDescriptor::new("Cnpj", |l: &Loja| &l.cnpj),
                FieldDescriptor::new("Endereco", |l: &Loja| &l.endereco),
                FieldDescriptor::new("Telefone", |l: &Loja| &l.telefone),
                FieldDescriptor::new("Situacao", |l: &Loja| &l.situacao),
            ]
        })
        .with_description("A store owned by a company")
    }

    fn to_boxed(&self) -> BoxedValue {
        BoxedValue::object(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Empresa {
    pub id: Uuid,
    pub nome: String,
    pub razao_social: String,
    pub fundacao: Date,
    pub lojas: Vec<Loja>,
}

impl Reflect for Empresa {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::composite::<Self>("Empresa", || {
            vec![
                FieldDescriptor::new("Id", |e: &Empresa| &e.id),
                FieldDescriptor::new("Nome", |e: &Empresa| &e.nome),
                FieldDescriptor::new("RazaoSocial", |e: &Empresa| &e.razao_social)
                    .with_description("Registered legal name"),
                FieldDescriptor::new("Fundacao", |e: &Empresa| &e.fundacao),
                FieldDescriptor::new("Lojas", |e: &Empresa| &e.lojas),
            ]
        })
    }

    fn to_boxed(&self) -> BoxedValue {
        BoxedValue::object(self.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdFilter {
    pub id: Uuid,
}

impl Reflect for IdFilter {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::composite::<Self>("IdFilter", || {
            vec![FieldDescriptor::new("Id", |f: &IdFilter| &f.id)]
        })
    }

    fn to_boxed(&self) -> BoxedValue {
        BoxedValue::object(self.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmpresaFilter {
    pub nome: Option<String>,
    pub situacao: Option<Situacao>,
}

impl Reflect for EmpresaFilter {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::composite::<Self>("EmpresaFilter", || {
            vec![
                FieldDescriptor::new("Nome", |f: &EmpresaFilter| &f.nome),
                FieldDescriptor::new("Situacao", |f: &EmpresaFilter| &f.situacao),
            ]
        })
    }

    fn to_boxed(&self) -> BoxedValue {
        BoxedValue::object(self.clone())
    }
}

pub const ACME_ID: &str = "6f1c1d7e-3c7a-4f0e-9a1a-2f1d4b9c8e01";
pub const GLOBEX_ID: &str = "0b9a2c55-7e44-4d8f-8b3e-91c7d2e6a402";

pub fn endereco(cidade: &str, numero: Option<i32>) -> Endereco {
    Endereco {
        cep: "01310-100".to_string(),
        cidade: cidade.to_string(),
        bairro: "Centro".to_string(),
        logradouro: "Avenida Paulista".to_string(),
        numero,
    }
}

pub fn empresas() -> Vec<Empresa> {
    vec![
        Empresa {
            id: Uuid::parse_str(ACME_ID).expect("valid uuid"),
            nome: "Acme".to_string(),
            razao_social: "Acme Comercio Ltda".to_string(),
            fundacao: date!(2001 - 05 - 17),
            lojas: vec![
                Loja {
                    id: Uuid::new_v4(),
                    nome: "Acme Paulista".to_string(),
                    cnpj: "11.222.333/0001-81".to_string(),
                    endereco: endereco("Sao Paulo", Some(1000)),
                    telefone: Some("+55 11 5555-0100".to_string()),
                    situacao: Situacao::Ativa,
                },
                Loja {
                    id: Uuid::new_v4(),
                    nome: "Acme Savassi".to_string(),
                    cnpj: "11.222.333/0002-62".to_string(),
                    endereco: endereco("Belo Horizonte", None),
                    telefone: None,
                    situacao: Situacao::Inativa,
                },
            ],
        },
        Empresa {
            id: Uuid::parse_str(GLOBEX_ID).expect("valid uuid"),
            nome: "Globex".to_string(),
            razao_social: "Globex Industria SA".to_string(),
            fundacao: date!(1998 - 11 - 02),
            lojas: Vec::new(),
        },
    ]
}

/// In-memory data source honoring `idFilter` and `filter` arguments.
pub struct EmpresaSource {
    pub empresas: Vec<Empresa>,
}

impl EmpresaSource {
    pub fn new() -> Self {
        Self {
            empresas: empresas(),
        }
    }
}

#[async_trait]
impl DataSource for EmpresaSource {
    async fn fetch(&self, args: &QueryArguments) -> Result<Vec<Instance>, GraphTypeError> {
        let id_filter = args.deserialize::<IdFilter>("idFilter")?;
        let filter = args.deserialize::<EmpresaFilter>("filter")?;

        Ok(self
            .empresas
            .iter()
            .filter(|empresa| id_filter.as_ref().is_none_or(|f| f.id == empresa.id))
            .filter(|empresa| {
                filter
                    .as_ref()
                    .and_then(|f| f.nome.as_deref())
                    .is_none_or(|nome| empresa.nome == nome)
            })
            .filter(|empresa| {
                filter.as_ref().and_then(|f| f.situacao).is_none_or(|situacao| {
                    empresa.lojas.iter().any(|loja| loja.situacao == situacao)
                })
            })
            .cloned()
            .map(Instance::new)
            .collect())
    }
}

/// Data source that always fails.
pub struct OfflineSource;

#[async_trait]
impl DataSource for OfflineSource {
    async fn fetch(&self, _args: &QueryArguments) -> Result<Vec<Instance>, GraphTypeError> {
        Err(GraphTypeError::source_failed("database offline"))
    }
}
