use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{CABECALHO_DOCUMENTO, DocumentoFiscal, PREFIXO_ERRO, RemessaResult, fmt_milhares};

/// Byte Order Mark UTF-8 ("utf-8-sig"), esperado pelo Excel.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Data no formato dd/mm/aaaa.
pub fn formatar_data(data: NaiveDate) -> String {
    data.format("%d/%m/%Y").to_string()
}

/// Duas casas decimais com vírgula como separador.
///
/// O arredondamento é bancário (meio para o par) sobre o valor decimal
/// exato. Planilhas que arredondam o `f64` correspondente podem divergir
/// no último dígito: 2,675 vira "2,68" aqui e "2,67" em ponto flutuante.
///
/// ```
/// use converter_remessas_dhl::formatar_decimal;
/// use rust_decimal::Decimal;
///
/// assert_eq!(formatar_decimal(Decimal::new(1, 0)), "1,00");
/// assert_eq!(formatar_decimal(Decimal::new(12345, 3)), "12,34");
/// ```
pub fn formatar_decimal(valor: Decimal) -> String {
    let scaled = valor.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    format!("{:.2}", scaled).replace('.', ",")
}

/// Caminhos dos arquivos gerados a partir do nome da planilha de origem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArquivosSaida {
    pub csv: PathBuf,
    pub erro_csv: PathBuf,
    pub zip: PathBuf,
}

impl ArquivosSaida {
    /// ```
    /// use converter_remessas_dhl::ArquivosSaida;
    /// use std::path::Path;
    ///
    /// let arquivos = ArquivosSaida::new(Path::new("download"), "remessas.xlsx");
    /// assert_eq!(arquivos.erro_csv, Path::new("download/erro_remessas.csv"));
    /// assert_eq!(arquivos.zip, Path::new("download/remessas.zip"));
    /// ```
    pub fn new(diretorio: &Path, arquivo: &str) -> Self {
        let nome = Path::new(arquivo)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| arquivo.to_string());

        ArquivosSaida {
            csv: diretorio.join(format!("{nome}.csv")),
            erro_csv: diretorio.join(format!("{PREFIXO_ERRO}{nome}.csv")),
            zip: diretorio.join(format!("{nome}.zip")),
        }
    }
}

/// Resultado final da gravação.
#[derive(Debug)]
pub enum Artefato {
    /// Os dois CSVs foram compactados e removidos.
    Zip(PathBuf),
    /// O zip foi finalizado, mas `sobras` não puderam ser removidos.
    ZipComSobras { zip: PathBuf, sobras: Vec<PathBuf> },
    /// A compactação falhou: os CSVs ficam no diretório.
    CsvSoltos {
        csv: PathBuf,
        erro_csv: PathBuf,
        erro: String,
    },
}

#[derive(Debug)]
pub struct Saida {
    pub com_ibge: usize,
    pub sem_ibge: usize,
    pub artefato: Artefato,
}

impl Saida {
    pub fn compactada(&self) -> bool {
        matches!(
            self.artefato,
            Artefato::Zip(_) | Artefato::ZipComSobras { .. }
        )
    }
}

/// Grava os documentos em dois CSVs (com e sem código IBGE) e compacta ambos.
///
/// Erros de gravação dos CSVs são propagados. Um erro na compactação é
/// registrado no log e os CSVs permanecem no diretório. CSVs que não puderam
/// ser removidos depois do zip finalizado são informados em
/// [`Artefato::ZipComSobras`].
pub fn gravar_saida(
    documentos: &[DocumentoFiscal],
    diretorio: &Path,
    arquivo: &str,
) -> RemessaResult<Saida> {
    fs::create_dir_all(diretorio)?;
    let arquivos = ArquivosSaida::new(diretorio, arquivo);

    let (com_ibge, sem_ibge): (Vec<&DocumentoFiscal>, Vec<&DocumentoFiscal>) =
        documentos.iter().partition(|doc| doc.tem_ibge());

    escrever_csv(&arquivos.csv, &com_ibge)?;
    escrever_csv(&arquivos.erro_csv, &sem_ibge)?;

    info!(
        "Documentos com IBGE: {} | sem IBGE: {}",
        fmt_milhares(com_ibge.len()),
        fmt_milhares(sem_ibge.len())
    );

    let compactacao = compactar(
        &[arquivos.csv.as_path(), arquivos.erro_csv.as_path()],
        &arquivos.zip,
    );

    let artefato = match compactacao {
        Ok(sobras) if sobras.is_empty() => {
            info!("Arquivo compactado: {:?}", arquivos.zip);
            Artefato::Zip(arquivos.zip)
        }
        Ok(sobras) => Artefato::ZipComSobras {
            zip: arquivos.zip,
            sobras,
        },
        Err(e) => {
            error!("Ocorreu um erro ao compactar {:?}: {e}", arquivos.zip);
            Artefato::CsvSoltos {
                csv: arquivos.csv,
                erro_csv: arquivos.erro_csv,
                erro: e.to_string(),
            }
        }
    };

    Ok(Saida {
        com_ibge: com_ibge.len(),
        sem_ibge: sem_ibge.len(),
        artefato,
    })
}

/// CSV separado por ';', UTF-8 com BOM e linha de cabeçalho.
pub fn escrever_csv(caminho: &Path, documentos: &[&DocumentoFiscal]) -> RemessaResult<()> {
    let mut file = BufWriter::new(File::create(caminho)?);
    file.write_all(UTF8_BOM)?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(file);

    wtr.write_record(CABECALHO_DOCUMENTO)?;

    for documento in documentos {
        wtr.write_record(documento.registro())?;
    }

    wtr.flush()?;
    Ok(())
}

/// Compacta `arquivos` (deflate) em `destino` e remove os originais.
///
/// Os originais só são removidos depois que o zip foi finalizado e fechado.
/// Em caso de falha o zip incompleto é apagado e os originais ficam intactos.
///
/// Retorna os originais que não puderam ser removidos (normalmente nenhum).
pub fn compactar(arquivos: &[&Path], destino: &Path) -> RemessaResult<Vec<PathBuf>> {
    if let Err(e) = escrever_zip(arquivos, destino) {
        if destino.exists() {
            let _ = fs::remove_file(destino);
        }
        return Err(e);
    }

    Ok(remover_originais(arquivos))
}

/// Tenta remover todos; uma falha não interrompe as demais remoções.
fn remover_originais(arquivos: &[&Path]) -> Vec<PathBuf> {
    arquivos
        .iter()
        .filter_map(|arquivo| match fs::remove_file(arquivo) {
            Ok(()) => None,
            Err(e) => {
                warn!("Não foi possível remover {arquivo:?}: {e}");
                Some(arquivo.to_path_buf())
            }
        })
        .collect()
}

fn escrever_zip(arquivos: &[&Path], destino: &Path) -> RemessaResult<()> {
    let mut zip = ZipWriter::new(File::create(destino)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for arquivo in arquivos {
        let nome = arquivo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        zip.start_file(nome, options)?;

        let mut origem = File::open(arquivo)?;
        io::copy(&mut origem, &mut zip)?;
    }

    // O File retornado é fechado aqui, antes de qualquer remoção.
    let mut file = zip.finish()?;
    file.flush()?;

    Ok(())
}
