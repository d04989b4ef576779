use calamine::{Data, Reader, open_workbook_auto};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{RemessaError, RemessaResult};

/// Conteúdo de uma célula: sempre texto, ou nulo quando vazia.
pub type Celula = Option<String>;

/// Tabela em memória com todas as colunas tipadas como texto.
///
/// Não há inferência numérica: códigos com zeros à esquerda (CEP, IBGE)
/// são preservados exatamente como aparecem no arquivo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tabela {
    pub colunas: Vec<String>,
    pub linhas: Vec<Vec<Celula>>,
}

impl Tabela {
    pub fn new(colunas: Vec<String>) -> Self {
        Tabela {
            colunas,
            linhas: Vec::new(),
        }
    }

    /// Monta uma tabela a partir de literais; texto vazio vira célula nula.
    ///
    /// ```
    /// use converter_remessas_dhl::Tabela;
    ///
    /// let tabela = Tabela::from_textos(&["HWB No", "Piece ID"], &[&["AB1", ""]]);
    /// assert_eq!(tabela.linhas[0], vec![Some("AB1".to_string()), None]);
    /// ```
    pub fn from_textos(colunas: &[&str], linhas: &[&[&str]]) -> Self {
        Tabela {
            colunas: colunas.iter().map(|c| c.to_string()).collect(),
            linhas: linhas
                .iter()
                .map(|linha| {
                    linha
                        .iter()
                        .map(|v| (!v.is_empty()).then(|| v.to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.linhas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.linhas.is_empty()
    }

    pub fn indice(&self, coluna: &str) -> Option<usize> {
        self.colunas.iter().position(|c| c == coluna)
    }

    /// Valor de uma célula, tratando linhas curtas como nulas.
    pub fn valor<'a>(linha: &'a [Celula], idx: usize) -> Option<&'a str> {
        linha.get(idx).and_then(|c| c.as_deref())
    }

    /// Mantém apenas a primeira ocorrência de cada chave.
    ///
    /// Linhas sem chave são descartadas: não há como relacioná-las.
    pub fn deduplicar_por(&mut self, idx: usize) {
        let mut vistas = HashSet::with_capacity(self.linhas.len());

        self.linhas.retain(|linha| match Tabela::valor(linha, idx) {
            Some(chave) => vistas.insert(chave.to_string()),
            None => false,
        });
    }

    /// Remove as linhas cuja coluna `idx` está vazia.
    pub fn descartar_nulos(&mut self, idx: usize) {
        self.linhas.retain(|linha| Tabela::valor(linha, idx).is_some());
    }

    /// Aplica `f` a todas as células não nulas.
    pub fn map_celulas<F>(&mut self, f: F)
    where
        F: Fn(&str) -> String,
    {
        self.linhas
            .iter_mut()
            .flat_map(|linha| linha.iter_mut())
            .flatten()
            .for_each(|texto| *texto = f(texto));
    }
}

/// Verifica nomes repetidos e a presença das colunas essenciais.
pub fn verificar_colunas_essenciais(
    tabela: &Tabela,
    essenciais: &[&str],
    arquivo: &Path,
) -> RemessaResult<()> {
    let mut vista = HashSet::with_capacity(tabela.colunas.len());

    for name in tabela.colunas.iter().filter(|c| !c.trim().is_empty()) {
        if !vista.insert(name) {
            return Err(RemessaError::DuplicateColumnName {
                arquivo: arquivo.to_path_buf(),
                coluna: name.to_string(),
            });
        }
    }

    if let Some(ausente) = essenciais
        .iter()
        .find(|&&essencial| tabela.indice(essencial).is_none())
    {
        return Err(RemessaError::MissingEssentialColumn {
            arquivo: arquivo.to_path_buf(),
            coluna: ausente.to_string(),
        });
    }

    Ok(())
}

/// Converte uma célula da planilha em texto.
fn celula_para_texto(celula: &Data) -> Celula {
    let texto = match celula {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(data) => data.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    };

    (!texto.is_empty()).then_some(texto)
}

/// Lê uma aba da planilha (xlsx, xls, ods) com todas as células como texto.
///
/// A primeira linha é o cabeçalho. Linhas totalmente vazias são ignoradas.
pub fn ler_aba(caminho: &Path, aba: &str) -> RemessaResult<Tabela> {
    // O calamine embrulha o erro de I/O no erro do formato: verificamos antes.
    fs::metadata(caminho).map_err(|e| RemessaError::IoReader {
        source: e,
        arquivo: caminho.to_path_buf(),
    })?;

    let mut workbook = open_workbook_auto(caminho).map_err(|source| RemessaError::Planilha {
        source,
        arquivo: caminho.to_path_buf(),
    })?;

    if !workbook.sheet_names().iter().any(|nome| nome == aba) {
        return Err(RemessaError::AbaNaoEncontrada {
            arquivo: caminho.to_path_buf(),
            aba: aba.to_string(),
        });
    }

    let range = workbook
        .worksheet_range(aba)
        .map_err(|source| RemessaError::Planilha {
            source,
            arquivo: caminho.to_path_buf(),
        })?;

    let mut rows = range.rows();

    let colunas: Vec<String> = rows
        .next()
        .map(|cabecalho| {
            cabecalho
                .iter()
                .map(|c| celula_para_texto(c).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let mut tabela = Tabela::new(colunas);

    tabela.linhas = rows
        .map(|row| row.iter().map(celula_para_texto).collect::<Vec<Celula>>())
        .filter(|linha| linha.iter().any(Option::is_some))
        .collect();

    debug!(
        "Aba <{aba}> de {:?}: {} colunas, {} linhas",
        caminho,
        tabela.colunas.len(),
        tabela.len()
    );

    Ok(tabela)
}

/// Lê um arquivo de texto delimitado por ';' (UTF-8, com cabeçalho).
pub fn ler_csv(caminho: &Path) -> RemessaResult<Tabela> {
    let file = File::open(caminho).map_err(|e| RemessaError::IoReader {
        source: e,
        arquivo: caminho.to_path_buf(),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let colunas: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
    let mut tabela = Tabela::new(colunas);

    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .map_err(|e| RemessaError::from_csv(e, PathBuf::from(caminho), idx + 2))?;

        tabela.linhas.push(
            record
                .iter()
                .map(|campo| (!campo.is_empty()).then(|| campo.to_string()))
                .collect(),
        );
    }

    Ok(tabela)
}
