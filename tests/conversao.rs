use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use converter_remessas_dhl::{
    Artefato, Caminhos, RemessaError, converter_remessas, converter_remessas_em,
};
use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

const CABECALHO_SHIPMENT: [&str; 10] = [
    "HWB No",
    "Clock Start",
    "Weight",
    "Value",
    "Piece No",
    "Receiver Name",
    "Rcvr Addr 1",
    "Rcvr Postcode",
    "Rcvr City",
    "Rcvr State",
];

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Célula numérica quando o texto começa com '#'.
fn celula_xml(referencia: &str, valor: &str) -> String {
    if valor.is_empty() {
        return String::new();
    }
    match valor.strip_prefix('#') {
        Some(numero) => format!(r#"<c r="{referencia}"><v>{numero}</v></c>"#),
        None => format!(r#"<c r="{referencia}" t="inlineStr"><is><t>{valor}</t></is></c>"#),
    }
}

fn aba_xml(linhas: &[Vec<&str>]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{NS_MAIN}"><sheetData>"#
    );

    for (i, linha) in linhas.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, i + 1));
        for (j, valor) in linha.iter().enumerate() {
            let coluna = char::from(b'A' + j as u8);
            xml.push_str(&celula_xml(&format!("{coluna}{}", i + 1), valor));
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Monta um xlsx mínimo com as abas 'Shipment' e 'Piece'.
fn criar_planilha(caminho: &Path, shipment: &[&[&str]], piece: &[&[&str]]) {
    let mut linhas_shipment = vec![CABECALHO_SHIPMENT.to_vec()];
    linhas_shipment.extend(shipment.iter().map(|l| l.to_vec()));

    let mut linhas_piece = vec![vec!["HWB No", "Piece ID"]];
    linhas_piece.extend(piece.iter().map(|l| l.to_vec()));

    let arquivos = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#
                .to_string(),
        ),
        (
            "_rels/.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="{NS_REL}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
            ),
        ),
        (
            "xl/workbook.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets><sheet name="Shipment" sheetId="1" r:id="rId1"/><sheet name="Piece" sheetId="2" r:id="rId2"/></sheets></workbook>"#
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="{NS_REL}/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="{NS_REL}/worksheet" Target="worksheets/sheet2.xml"/></Relationships>"#
            ),
        ),
        ("xl/worksheets/sheet1.xml", aba_xml(&linhas_shipment)),
        ("xl/worksheets/sheet2.xml", aba_xml(&linhas_piece)),
    ];

    let mut zip = ZipWriter::new(File::create(caminho).unwrap());
    for (nome, conteudo) in arquivos {
        zip.start_file(nome, SimpleFileOptions::default()).unwrap();
        zip.write_all(conteudo.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Diretório base com a estrutura app/data/{upload,download} e app/libs.
fn preparar_base(municipios: &str) -> (tempfile::TempDir, Caminhos) {
    let base = tempfile::tempdir().unwrap();
    let caminhos = Caminhos::new(base.path());

    fs::create_dir_all(&caminhos.upload).unwrap();
    fs::create_dir_all(caminhos.municipios.parent().unwrap()).unwrap();
    fs::write(&caminhos.municipios, municipios).unwrap();

    (base, caminhos)
}

fn arquivos_em(diretorio: &Path) -> Vec<String> {
    let mut nomes: Vec<String> = fs::read_dir(diretorio)
        .map(|entradas| {
            entradas
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    nomes.sort();
    nomes
}

/// Linhas do CSV compactado como mapas coluna -> valor.
fn ler_csv_do_zip(zip: &Path, nome: &str) -> Vec<Vec<(String, String)>> {
    let mut arquivo = ZipArchive::new(File::open(zip).unwrap()).unwrap();
    let mut conteudo = String::new();
    arquivo
        .by_name(nome)
        .unwrap()
        .read_to_string(&mut conteudo)
        .unwrap();

    let conteudo = conteudo
        .strip_prefix('\u{feff}')
        .expect("CSV sem BOM UTF-8");

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(conteudo.as_bytes());

    let cabecalho: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();

    rdr.records()
        .map(|r| {
            let registro = r.unwrap();
            cabecalho
                .iter()
                .cloned()
                .zip(registro.iter().map(String::from))
                .collect()
        })
        .collect()
}

fn campo<'a>(linha: &'a [(String, String)], coluna: &str) -> &'a str {
    linha
        .iter()
        .find(|(c, _)| c == coluna)
        .map(|(_, v)| v.as_str())
        .unwrap()
}

fn zip_da_saida(artefato: &Artefato) -> PathBuf {
    match artefato {
        Artefato::Zip(zip) => zip.clone(),
        outro => panic!("esperado zip, obtido {outro:?}"),
    }
}

#[test]
fn poa_descarta_remessa_sem_data() {
    let (base, caminhos) = preparar_base("Municipio;ibge\nRS_PORTO_ALEGRE;4314902\n");

    criar_planilha(
        &caminhos.planilha("remessas.xlsx"),
        &[
            &[
                "AB123456",
                "2024-01-15 10:30:00",
                "#2.5",
                "#0",
                "#1",
                "José da Silva",
                "Av. Ipiranga 100",
                "90160-093",
                "Porto Alegre",
                "RS",
            ],
            &["AB123457", "", "#1", "#10", "#1", "Maria", "Rua B", "", "Porto Alegre", "RS"],
        ],
        &[&["AB123456", "JD0146000011"]],
    );

    let saida = converter_remessas("POA", "remessas.xlsx", base.path()).unwrap();

    assert_eq!((saida.com_ibge, saida.sem_ibge), (1, 0));
    assert_eq!(arquivos_em(&caminhos.download), vec!["remessas.zip"]);

    let linhas = ler_csv_do_zip(&zip_da_saida(&saida.artefato), "remessas.csv");
    assert_eq!(linhas.len(), 1);

    let linha = &linhas[0];
    assert_eq!(campo(linha, "Nº Pedido"), "AB123456");
    assert_eq!(campo(linha, "Nota Fiscal"), "123456");
    assert_eq!(campo(linha, "CNPJ/CPF Emitente"), "58.890.252/0005-47");
    assert_eq!(campo(linha, "Data Emissão NF"), "15/01/2024");
    assert_eq!(campo(linha, "Peso"), "2,50");
    assert_eq!(campo(linha, "Valor NF"), "1,00");
    assert_eq!(campo(linha, "Codigo de Volumes"), "JD0146000011");
    assert_eq!(campo(linha, "Nome do Destinatario"), "JOSE DA SILVA");
    assert_eq!(campo(linha, "CEP Destinatario"), "90160093");
    assert_eq!(campo(linha, "Cidade (IBGE) Destinatario"), "4314902");
    assert_eq!(campo(linha, "CNPJ/CPF do destinatário").len(), 11);
    assert_eq!(
        campo(linha, "CNPJ/CPF do destinatário"),
        campo(linha, "CNPJ/CPF do Recebedor")
    );

    let erros = ler_csv_do_zip(&zip_da_saida(&saida.artefato), "erro_remessas.csv");
    assert!(erros.is_empty());
}

#[test]
fn municipio_sem_codigo_vai_para_arquivo_de_erro() {
    let (base, caminhos) = preparar_base("Municipio;ibge\nSC_BLUMENAU;4202404\n");

    criar_planilha(
        &caminhos.planilha("dhl 455.xlsx"),
        &[&[
            "AB000001",
            "2024-05-02",
            "#1",
            "#99.9",
            "#3",
            "Ana",
            "Rua C",
            "",
            "Porto Alegre",
            "RS",
        ]],
        &[],
    );

    let saida = converter_remessas("bnu", "dhl 455.xlsx", base.path()).unwrap();
    assert_eq!((saida.com_ibge, saida.sem_ibge), (0, 1));

    let zip = zip_da_saida(&saida.artefato);
    assert!(ler_csv_do_zip(&zip, "dhl 455.csv").is_empty());

    let erros = ler_csv_do_zip(&zip, "erro_dhl 455.csv");
    assert_eq!(erros.len(), 1);
    assert_eq!(campo(&erros[0], "Nº Pedido"), "AB000001");
    assert_eq!(campo(&erros[0], "Cidade (IBGE) Destinatario"), "");
    assert_eq!(campo(&erros[0], "Codigo de Volumes"), "");
    assert_eq!(campo(&erros[0], "CNPJ/CPF Emitente"), "58.890.252/0001-13");
}

#[test]
fn filial_desconhecida_nao_gera_arquivos() {
    let (base, caminhos) = preparar_base("Municipio;ibge\n");
    criar_planilha(&caminhos.planilha("remessas.xlsx"), &[], &[]);

    let erro = converter_remessas("SSA", "remessas.xlsx", base.path()).unwrap_err();

    assert!(erro.eh_entrada_invalida());
    assert!(arquivos_em(&caminhos.download).is_empty());
}

#[test]
fn tabela_de_municipios_ausente() {
    let (base, caminhos) = preparar_base("");
    fs::remove_file(&caminhos.municipios).unwrap();
    criar_planilha(&caminhos.planilha("remessas.xlsx"), &[], &[]);

    let erro = converter_remessas("CWB", "remessas.xlsx", base.path()).unwrap_err();

    assert!(matches!(
        erro,
        RemessaError::IoReader { arquivo, .. } if arquivo == caminhos.municipios
    ));
    assert!(arquivos_em(&caminhos.download).is_empty());
}

#[test]
fn planilha_ausente() {
    let (base, _caminhos) = preparar_base("Municipio;ibge\n");

    let erro = converter_remessas("CWB", "nao_existe.xlsx", base.path()).unwrap_err();

    assert!(matches!(erro, RemessaError::IoReader { .. }));
}

#[test]
fn inscricao_divergente_nao_interrompe() {
    let (base, caminhos) = preparar_base("Municipio;ibge\nPR_CURITIBA;4106902\n");
    fs::write(&caminhos.inscricoes, "CNPJ;IE\n58.890.252/0014-38;123\n").unwrap();

    criar_planilha(
        &caminhos.planilha("cwb.xlsx"),
        &[&["AB9", "2024-05-02", "#1", "#1", "#1", "Ana", "Rua", "80000-000", "Curitiba", "PR"]],
        &[],
    );

    let saida = converter_remessas("CWB", "cwb.xlsx", base.path()).unwrap();

    assert!(saida.compactada());
    assert_eq!(saida.com_ibge, 1);
}

#[test]
fn caminhos_resolvidos_fora_do_padrao() {
    let base = tempfile::tempdir().unwrap();
    let caminhos = Caminhos {
        upload: base.path().join("entrada"),
        download: base.path().join("saida"),
        municipios: base.path().join("tabelas").join("municipios.csv"),
        inscricoes: base.path().join("tabelas").join("ie.csv"),
    };

    fs::create_dir_all(&caminhos.upload).unwrap();
    fs::create_dir_all(base.path().join("tabelas")).unwrap();
    fs::write(&caminhos.municipios, "Municipio;ibge\nRS_CANOAS;4304606\n").unwrap();

    criar_planilha(
        &caminhos.planilha("canoas.xlsx"),
        &[&["AB777", "03/09/2024", "#1", "#1", "#1", "Ana", "Rua", "", "Canoas", "RS"]],
        &[],
    );

    let saida = converter_remessas_em("POA", "canoas.xlsx", &caminhos).unwrap();

    assert_eq!(arquivos_em(&caminhos.download), vec!["canoas.zip"]);
    assert!(!base.path().join("app").exists());

    let linhas = ler_csv_do_zip(&zip_da_saida(&saida.artefato), "canoas.csv");
    assert_eq!(campo(&linhas[0], "Cidade (IBGE) Destinatario"), "4304606");
    assert_eq!(campo(&linhas[0], "Data Emissão NF"), "09/03/2024");
}
