use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::{collections::HashMap, path::Path, str::FromStr};
use tracing::{debug, info, warn};

use crate::{
    ABA_PIECE, ABA_SHIPMENT, COLUNAS_PIECE, COLUNAS_SHIPMENT, Caminhos, DocumentoFiscal,
    DocumentoFiscalBuilder, Filial, Participante, RE_NON_DIGITS, RemessaError, RemessaResult,
    Saida, Tabela, TabelaInscricoes, TabelaMunicipios, chave_municipio, colunas_essenciais,
    fmt_milhares, gerar_cpf, gravar_saida, ler_aba, normalizar_tabela,
    verificar_colunas_essenciais,
};

/// Número de dígitos do CEP.
const DIGITOS_CEP: usize = 8;

/// Formatos aceitos para 'Clock Start' (após a normalização para maiúsculas).
///
/// Datas com barras são lidas primeiro como mês/dia/ano; dia/mês/ano só
/// vale quando o primeiro campo não pode ser mês (maior que 12).
const FORMATOS_DATA_HORA: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];
const FORMATOS_DATA: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Converte a planilha de remessas de uma filial no CSV de Documentos Fiscais.
///
/// Etapas:
/// 1. Identificar a filial (código desconhecido encerra sem gerar arquivos).
/// 2. Ler as abas 'Shipment' e 'Piece' e a tabela de municípios.
/// 3. Transformar as remessas em documentos ([`transformar`]).
/// 4. Gravar os CSVs e compactá-los ([`gravar_saida`]).
pub fn converter_remessas(
    codigo_filial: &str,
    arquivo: &str,
    diretorio_base: &Path,
) -> RemessaResult<Saida> {
    converter_remessas_em(codigo_filial, arquivo, &Caminhos::new(diretorio_base))
}

/// Como [`converter_remessas`], com os caminhos já resolvidos.
pub fn converter_remessas_em(
    codigo_filial: &str,
    arquivo: &str,
    caminhos: &Caminhos,
) -> RemessaResult<Saida> {
    let filial: Filial = codigo_filial.parse()?;

    info!("Filial {filial}: processando <{arquivo}>");

    let planilha = caminhos.planilha(arquivo);
    let shipment = ler_aba(&planilha, ABA_SHIPMENT)?;
    let piece = ler_aba(&planilha, ABA_PIECE)?;

    let municipios = TabelaMunicipios::carregar(&caminhos.municipios)?;
    conferir_inscricao(filial, caminhos);

    let documentos = transformar(filial, shipment, piece, &municipios, &planilha)?;

    gravar_saida(&documentos, &caminhos.download, arquivo)
}

/// A tabela de inscrições é opcional: serve apenas para alertar divergências.
fn conferir_inscricao(filial: Filial, caminhos: &Caminhos) {
    if !caminhos.inscricoes.exists() {
        debug!("Tabela de inscrições ausente: {:?}", caminhos.inscricoes);
        return;
    }

    match TabelaInscricoes::carregar(&caminhos.inscricoes) {
        Ok(inscricoes) => {
            inscricoes.conferir_filial(filial);
        }
        Err(e) => warn!("Tabela de inscrições ignorada: {e}"),
    }
}

/// Índices das colunas usadas da aba 'Shipment'.
struct ColunasShipment {
    hwb: usize,
    data_emissao: usize,
    peso: usize,
    valor: usize,
    qtd_volumes: usize,
    nome: usize,
    endereco: usize,
    cep: usize,
    cidade: usize,
    estado: usize,
}

impl ColunasShipment {
    fn localizar(tabela: &Tabela, arquivo: &Path) -> RemessaResult<Self> {
        verificar_colunas_essenciais(tabela, &colunas_essenciais(&COLUNAS_SHIPMENT), arquivo)?;

        let idx = |chave: &str| -> RemessaResult<usize> {
            let coluna = COLUNAS_SHIPMENT
                .get(chave)
                .ok_or_else(|| RemessaError::Config(format!("Configuração '{chave}' ausente")))?;

            tabela
                .indice(coluna)
                .ok_or_else(|| RemessaError::MissingEssentialColumn {
                    arquivo: arquivo.to_path_buf(),
                    coluna: coluna.to_string(),
                })
        };

        Ok(ColunasShipment {
            hwb: idx("hwb")?,
            data_emissao: idx("data_emissao")?,
            peso: idx("peso")?,
            valor: idx("valor")?,
            qtd_volumes: idx("qtd_volumes")?,
            nome: idx("nome_destinatario")?,
            endereco: idx("endereco_destinatario")?,
            cep: idx("cep_destinatario")?,
            cidade: idx("cidade_destinatario")?,
            estado: idx("estado_destinatario")?,
        })
    }
}

/// Código de volume de cada HWB (primeira ocorrência na aba 'Piece').
fn indexar_volumes(
    mut piece: Tabela,
    arquivo: &Path,
) -> RemessaResult<HashMap<String, Option<String>>> {
    verificar_colunas_essenciais(&piece, &colunas_essenciais(&COLUNAS_PIECE), arquivo)?;

    let idx_hwb = piece.indice(COLUNAS_PIECE["hwb"]).unwrap_or_default();
    let idx_volume = piece.indice(COLUNAS_PIECE["codigo_volume"]).unwrap_or_default();

    normalizar_tabela(&mut piece);
    piece.deduplicar_por(idx_hwb);

    Ok(piece
        .linhas
        .into_iter()
        .filter_map(|mut linha| {
            let volume = linha.get_mut(idx_volume).and_then(Option::take);
            let hwb = linha.get_mut(idx_hwb).and_then(Option::take)?;
            Some((hwb, volume))
        })
        .collect())
}

/// Transforma as abas normalizadas em documentos fiscais.
///
/// - Remessas e volumes repetidos (mesmo HWB): vale a primeira ocorrência.
/// - Remessas sem data de emissão são descartadas.
/// - Peso ou valor igual a zero passa a ser 1.
/// - Destinatário sem código IBGE segue com o campo vazio (irá para o arquivo de erro).
pub fn transformar(
    filial: Filial,
    mut shipment: Tabela,
    piece: Tabela,
    municipios: &TabelaMunicipios,
    arquivo: &Path,
) -> RemessaResult<Vec<DocumentoFiscal>> {
    let col = ColunasShipment::localizar(&shipment, arquivo)?;
    let volumes = indexar_volumes(piece, arquivo)?;

    normalizar_tabela(&mut shipment);

    let lidas = shipment.len();
    shipment.deduplicar_por(col.hwb);
    let unicas = shipment.len();
    shipment.descartar_nulos(col.data_emissao);

    info!(
        "Remessas: {} lidas, {} únicas, {} sem data de emissão descartadas",
        fmt_milhares(lidas),
        fmt_milhares(unicas),
        fmt_milhares(unicas - shipment.len())
    );

    let mut documentos = Vec::with_capacity(shipment.len());

    for linha in &shipment.linhas {
        let Some(hwb) = Tabela::valor(linha, col.hwb) else {
            continue;
        };

        let texto = |idx: usize| Tabela::valor(linha, idx);
        let campo = |idx: usize| texto(idx).map(String::from);

        let data_emissao = texto(col.data_emissao)
            .and_then(interpretar_data)
            .ok_or_else(|| RemessaError::DataInvalida {
                hwb: hwb.to_string(),
                valor: texto(col.data_emissao).unwrap_or_default().to_string(),
            })?;

        let peso = ler_numero(hwb, &COLUNAS_SHIPMENT["peso"], texto(col.peso))?;
        let valor = ler_numero(hwb, &COLUNAS_SHIPMENT["valor"], texto(col.valor))?;

        let ibge = chave_municipio(texto(col.estado), texto(col.cidade))
            .and_then(|chave| municipios.codigo_ibge(&chave))
            .map(String::from);

        let destinatario = Participante {
            nome: campo(col.nome),
            cnpj_cpf: Some(gerar_cpf()),
            cep: formatar_cep(texto(col.cep)),
            rua: campo(col.endereco),
            ibge,
            ..Default::default()
        };

        let documento = DocumentoFiscalBuilder::new(hwb, data_emissao, filial)
            .valor_nf(piso_unitario(valor))
            .peso(piso_unitario(peso))
            .qtd_volumes(campo(col.qtd_volumes))
            .codigo_volumes(volumes.get(hwb).cloned().flatten())
            .destinatario(destinatario)
            .build();

        documentos.push(documento);
    }

    let sem_ibge = documentos.iter().filter(|doc| !doc.tem_ibge()).count();
    if sem_ibge > 0 {
        warn!(
            "{} remessa(s) sem código IBGE do município do destinatário",
            fmt_milhares(sem_ibge)
        );
    }

    Ok(documentos)
}

/// Valores iguais a zero passam a ser 1; os demais não mudam.
///
/// ```
/// use converter_remessas_dhl::piso_unitario;
/// use rust_decimal::Decimal;
///
/// assert_eq!(piso_unitario(Decimal::ZERO), Decimal::ONE);
/// assert_eq!(piso_unitario(Decimal::new(25, 1)), Decimal::new(25, 1));
/// ```
pub fn piso_unitario(valor: Decimal) -> Decimal {
    if valor.is_zero() { Decimal::ONE } else { valor }
}

/// Célula vazia conta como zero.
fn ler_numero(hwb: &str, coluna: &str, texto: Option<&str>) -> RemessaResult<Decimal> {
    match texto {
        None => Ok(Decimal::ZERO),
        Some(t) => interpretar_numero(t).ok_or_else(|| RemessaError::NumeroInvalido {
            hwb: hwb.to_string(),
            coluna: coluna.to_string(),
            valor: t.to_string(),
        }),
    }
}

/// Aceita ponto ou vírgula como separador decimal e notação científica.
pub fn interpretar_numero(texto: &str) -> Option<Decimal> {
    let texto = texto.trim();

    Decimal::from_str(texto)
        .or_else(|_| Decimal::from_str(&texto.replace(',', ".")))
        .or_else(|_| Decimal::from_scientific(texto))
        .ok()
}

/// Data de emissão a partir dos formatos textuais mais comuns.
pub fn interpretar_data(texto: &str) -> Option<NaiveDate> {
    let texto = texto.trim();

    FORMATOS_DATA_HORA
        .iter()
        .find_map(|formato| NaiveDateTime::parse_from_str(texto, formato).ok())
        .map(|data_hora| data_hora.date())
        .or_else(|| {
            FORMATOS_DATA
                .iter()
                .find_map(|formato| NaiveDate::parse_from_str(texto, formato).ok())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(texto)
                .ok()
                .map(|data_hora| data_hora.date_naive())
        })
}

/// CEP com 8 dígitos (zeros à esquerda); sem dígitos, fica vazio.
///
/// ```
/// use converter_remessas_dhl::formatar_cep;
///
/// assert_eq!(formatar_cep(Some("90010-000")).as_deref(), Some("90010000"));
/// assert_eq!(formatar_cep(Some("1310100")).as_deref(), Some("01310100"));
/// assert_eq!(formatar_cep(Some("N/A")), None);
/// ```
pub fn formatar_cep(texto: Option<&str>) -> Option<String> {
    let digitos = RE_NON_DIGITS.replace_all(texto?, "");

    if digitos.is_empty() {
        None
    } else {
        Some(format!("{:0>width$}", digitos, width = DIGITOS_CEP))
    }
}
