use clap::Parser;
use std::path::{Path, PathBuf};

use crate::{REGEX_PLANILHA, RemessaError, RemessaResult};

// Estrutura para o Clap processar os argumentos da linha de comando
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Arguments {
    /// Limpar a tela
    #[arg(short, long, default_value_t = false)]
    clear: bool,

    /// Código da filial DHL de origem: POA, BNU ou CWB
    #[arg(short, long, required = true)]
    filial: String,

    /// Planilha de remessas (xlsx) contida em `<diretorio>/app/data/upload/`.
    ///
    /// Abas esperadas:
    ///
    /// - `Shipment`
    /// - `Piece`
    #[arg(short, long, required = true)]
    arquivo: String,

    /// Diretório base da aplicação
    #[arg(short, long, default_value = ".")]
    diretorio: PathBuf,

    /// Ativar modo detalhado (verbose)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// Estrutura de diretórios sob o diretório base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caminhos {
    pub upload: PathBuf,
    pub download: PathBuf,
    pub municipios: PathBuf,
    pub inscricoes: PathBuf,
}

impl Caminhos {
    /// ```
    /// use converter_remessas_dhl::Caminhos;
    /// use std::path::Path;
    ///
    /// let caminhos = Caminhos::new(Path::new("/srv/fiscal"));
    /// assert_eq!(caminhos.upload, Path::new("/srv/fiscal/app/data/upload"));
    /// assert_eq!(caminhos.municipios, Path::new("/srv/fiscal/app/libs/municipio.csv"));
    /// ```
    pub fn new(base: &Path) -> Self {
        let data = base.join("app").join("data");
        let libs = base.join("app").join("libs");

        Caminhos {
            upload: data.join("upload"),
            download: data.join("download"),
            municipios: libs.join("municipio.csv"),
            inscricoes: libs.join("ie.csv"),
        }
    }

    pub fn planilha(&self, arquivo: &str) -> PathBuf {
        self.upload.join(arquivo)
    }
}

#[derive(Debug)]
pub struct Config {
    pub clear: bool,
    pub filial: String,
    pub arquivo: String,
    pub diretorio: PathBuf,
    pub verbose: bool,
    pub caminhos: Caminhos,
}

impl Config {
    pub fn new(filial: &str, arquivo: &str, diretorio: &Path) -> RemessaResult<Self> {
        validar_nome_da_planilha(arquivo)?;

        Ok(Config {
            clear: false,
            filial: filial.to_string(),
            arquivo: arquivo.to_string(),
            diretorio: diretorio.to_path_buf(),
            verbose: false,
            caminhos: Caminhos::new(diretorio),
        })
    }
}

pub fn get_config() -> RemessaResult<Config> {
    let args = Arguments::parse();

    let mut config = Config::new(&args.filial, &args.arquivo, &args.diretorio)?;
    config.clear = args.clear;
    config.verbose = args.verbose;

    Ok(config)
}

/// O nome deve ser de um arquivo (sem diretórios) com extensão de planilha.
pub fn validar_nome_da_planilha(arquivo: &str) -> RemessaResult<()> {
    if REGEX_PLANILHA.is_match(arquivo) {
        Ok(())
    } else {
        Err(RemessaError::Config(format!(
            "Nome de planilha inválido: '{arquivo}' (esperado, por exemplo, 'remessas.xlsx')"
        )))
    }
}
