use std::collections::HashMap;
use std::sync::LazyLock;

// --- Tabelas de Referência ---

/// Abas da planilha de remessas DHL.
pub const ABA_SHIPMENT: &str = "Shipment";
pub const ABA_PIECE: &str = "Piece";

/// Colunas do arquivo de municípios (`municipio.csv`).
pub const COLUNA_MUNICIPIO: &str = "Municipio";
pub const COLUNA_IBGE: &str = "ibge";

/// Colunas do arquivo de inscrições estaduais (`ie.csv`).
pub const COLUNA_IE_CNPJ: &str = "CNPJ";
pub const COLUNA_IE_INSCRICAO: &str = "IE";

// Mapeamento estático para colunas da aba 'Shipment'
pub static COLUNAS_SHIPMENT: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        HashMap::from([
            ("hwb", "HWB No"),
            ("data_emissao", "Clock Start"),
            ("peso", "Weight"),
            ("valor", "Value"),
            ("qtd_volumes", "Piece No"),
            ("nome_destinatario", "Receiver Name"),
            ("endereco_destinatario", "Rcvr Addr 1"),
            ("cep_destinatario", "Rcvr Postcode"),
            ("cidade_destinatario", "Rcvr City"),
            ("estado_destinatario", "Rcvr State"),
        ])
    });

// Mapeamento estático para colunas da aba 'Piece'
pub static COLUNAS_PIECE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([("hwb", "HWB No"), ("codigo_volume", "Piece ID")])
});

/// Número de colunas do layout de Documentos Fiscais.
pub const NUM_COLUNAS_DOCUMENTO: usize = 46;

/// Cabeçalho do CSV de Documentos Fiscais, na ordem de gravação.
pub const CABECALHO_DOCUMENTO: [&str; NUM_COLUNAS_DOCUMENTO] = [
    // Dados da mercadoria
    "Nota Fiscal",
    "Série NF",
    "Chave NF",
    "Data Emissão NF",
    "Nº Pedido",
    "Valor NF",
    "Peso",
    "Qtd Volumes",
    "Metro Cubico",
    "Codigo de Volumes",
    "CFOP",
    "Operação",
    "Codigo Tabela Preço",
    "Pagador do frete",
    "NCM",
    "PIN(Suframa)",
    "Observações da NF",
    // Emitente
    "Nome do Emitente",
    "CNPJ/CPF Emitente",
    "IE Emitente",
    "CEP Emitente",
    "Rua Emitente",
    "Complemento Emitente",
    "Numero Emitente",
    "Bairro",
    "Ciadade(IBGE)",
    // Destinatário
    "Nome do Destinatario",
    "CNPJ/CPF do destinatário",
    "IE do Destinatario",
    "RG Destinatario",
    "CEP Destinatario",
    "Rua Destinatario",
    "Complemento Destinatario",
    "Nº Destinatario",
    "Bairo Destinatario",
    "Cidade (IBGE) Destinatario",
    // Recebedor
    "Nome do Recebedor",
    "CNPJ/CPF do Recebedor",
    "IE do Recebedor",
    "RG Recebedor",
    "CEP Recebedor",
    "Rua Recebedor",
    "Complemento Recebedor",
    "Nº Recebedor",
    "Bairo Recebedor",
    "Cidade (IBGE) Recebedor",
];

/// Valores fixos do documento.
pub const SERIE_NF: &str = "1";
pub const CFOP: &str = "5353";
pub const OPERACAO: &str = "SAIDA";
pub const PAGADOR_DO_FRETE: &str = "EMITENTE";

/// Prefixo do arquivo com as remessas sem código IBGE.
pub const PREFIXO_ERRO: &str = "erro_";

/// Nomes das colunas essenciais, em ordem alfabética.
pub fn colunas_essenciais(mapa: &HashMap<&'static str, &'static str>) -> Vec<&'static str> {
    let mut colunas: Vec<&'static str> = mapa.values().copied().collect();
    colunas.sort_unstable();
    colunas
}
