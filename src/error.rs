use std::{io, path::PathBuf};
use thiserror::Error;

/// Tipo de retorno conveniente para todo o projeto
pub type RemessaResult<T> = Result<T, RemessaError>;

#[derive(Error, Debug)]
pub enum RemessaError {
    #[error("Aba <{aba}> não encontrada na planilha {arquivo:?}")]
    AbaNaoEncontrada { arquivo: PathBuf, aba: String },

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro no processamento CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(
        "Erro no número de colunas!\n\
        Arquivo: {arquivo:?}\n\
        Linha nº: {linha}\n\
        Esperado: {esperado} colunas\n\
        Encontrado: {encontrado} colunas"
    )]
    ColumnCount {
        arquivo: PathBuf,
        linha: usize,
        esperado: usize,
        encontrado: usize,
    },

    #[error("Data de emissão inválida na remessa <{hwb}>: '{valor}'")]
    DataInvalida { hwb: String, valor: String },

    #[error("Arquivo <{arquivo}> contém colunas repetidas: <{coluna}>")]
    DuplicateColumnName { arquivo: PathBuf, coluna: String },

    #[error(
        "Filial DHL não encontrada: '{0}'\n\
        Filiais válidas: POA, BNU, CWB"
    )]
    FilialDesconhecida(String),

    #[error("Erro de I/O: {0}")]
    Io(#[from] io::Error),

    #[error(
        "Arquivo não encontrado!\n\
        Arquivo: {arquivo:?}\n\
        {source}"
    )]
    IoReader {
        #[source]
        source: io::Error,
        arquivo: PathBuf,
    },

    #[error("Coluna essencial ausente no arquivo <{arquivo}>: {coluna}")]
    MissingEssentialColumn { arquivo: PathBuf, coluna: String },

    #[error("Valor numérico inválido na coluna <{coluna}> da remessa <{hwb}>: '{valor}'")]
    NumeroInvalido {
        hwb: String,
        coluna: String,
        valor: String,
    },

    #[error("Erro ao abrir a planilha {arquivo:?}: {source}")]
    Planilha {
        #[source]
        source: calamine::Error,
        arquivo: PathBuf,
    },

    #[error("Erro ao compactar arquivos: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl RemessaError {
    pub fn from_csv(e: csv::Error, arquivo: PathBuf, linha: usize) -> Self {
        if let csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } = e.kind()
        {
            return RemessaError::ColumnCount {
                arquivo,
                linha,
                esperado: *expected_len as usize,
                encontrado: *len as usize,
            };
        }
        RemessaError::Csv(e)
    }

    /// Erros de entrada do usuário: o processamento é abortado sem gerar arquivos.
    pub fn eh_entrada_invalida(&self) -> bool {
        matches!(self, RemessaError::FilialDesconhecida(_))
    }
}
