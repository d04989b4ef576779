mod args;
mod cpf;
mod documento;
mod error;
mod filial;
mod metadata;
mod normalizar;
mod pipeline;
mod referencia;
mod regex;
mod saida;
mod sistema;
mod tabela;

pub use self::{
    args::*, cpf::*, documento::*, error::*, filial::*, metadata::*, normalizar::*, pipeline::*,
    referencia::*, regex::*, saida::*, sistema::*, tabela::*,
};
