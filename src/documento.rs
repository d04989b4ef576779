use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    CFOP, Filial, NOME_EMITENTE, NUM_COLUNAS_DOCUMENTO, OPERACAO, PAGADOR_DO_FRETE, SERIE_NF,
    formatar_data, formatar_decimal,
};

/// Número de caracteres finais do HWB usados como número da nota.
const DIGITOS_NOTA_FISCAL: usize = 6;

/// Bloco de identificação de uma parte do documento (emitente, destinatário ou recebedor).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Participante {
    pub nome: Option<String>,
    pub cnpj_cpf: Option<String>,
    pub ie: Option<String>,
    pub rg: Option<String>,
    pub cep: Option<String>,
    pub rua: Option<String>,
    pub complemento: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub ibge: Option<String>,
}

impl Participante {
    /// Emitente: a filial DHL de origem.
    pub fn emitente(filial: Filial) -> Self {
        let identidade = filial.identidade();
        let campo = |valor: &str| (!valor.is_empty()).then(|| valor.to_string());

        Participante {
            nome: Some(NOME_EMITENTE.to_string()),
            cnpj_cpf: campo(identidade.cnpj),
            ie: campo(identidade.inscricao_estadual),
            rg: None,
            cep: campo(identidade.cep),
            rua: campo(identidade.rua),
            complemento: campo(identidade.complemento),
            numero: campo(identidade.numero),
            bairro: campo(identidade.bairro),
            ibge: campo(identidade.ibge),
        }
    }
}

/// Uma linha do layout de Documentos Fiscais.
///
/// Não existe bloco próprio do recebedor: ele é sempre a cópia do destinatário
/// (veja [`DocumentoFiscal::recebedor`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentoFiscal {
    pub nota_fiscal: String,
    pub pedido: String,
    pub data_emissao: NaiveDate,
    pub valor_nf: Decimal,
    pub peso: Decimal,
    pub qtd_volumes: Option<String>,
    pub codigo_volumes: Option<String>,
    pub emitente: Participante,
    pub destinatario: Participante,
}

impl DocumentoFiscal {
    pub fn recebedor(&self) -> &Participante {
        &self.destinatario
    }

    /// Remessa resolvida: o município do destinatário tem código IBGE.
    pub fn tem_ibge(&self) -> bool {
        self.destinatario.ibge.is_some()
    }

    /// Campos formatados, na ordem de [`crate::CABECALHO_DOCUMENTO`].
    pub fn registro(&self) -> Vec<String> {
        let texto = |valor: &Option<String>| valor.clone().unwrap_or_default();

        let mut campos = Vec::with_capacity(NUM_COLUNAS_DOCUMENTO);

        // Dados da mercadoria
        campos.extend([
            self.nota_fiscal.clone(),
            SERIE_NF.to_string(),
            String::new(), // Chave NF
            formatar_data(self.data_emissao),
            self.pedido.clone(),
            formatar_decimal(self.valor_nf),
            formatar_decimal(self.peso),
            texto(&self.qtd_volumes),
            String::new(), // Metro Cubico
            texto(&self.codigo_volumes),
            CFOP.to_string(),
            OPERACAO.to_string(),
            String::new(), // Codigo Tabela Preço
            PAGADOR_DO_FRETE.to_string(),
            String::new(), // NCM
            String::new(), // PIN(Suframa)
            String::new(), // Observações da NF
        ]);

        let emitente = &self.emitente;
        campos.extend([
            texto(&emitente.nome),
            texto(&emitente.cnpj_cpf),
            texto(&emitente.ie),
            texto(&emitente.cep),
            texto(&emitente.rua),
            texto(&emitente.complemento),
            texto(&emitente.numero),
            texto(&emitente.bairro),
            texto(&emitente.ibge),
        ]);

        for parte in [&self.destinatario, self.recebedor()] {
            campos.extend([
                texto(&parte.nome),
                texto(&parte.cnpj_cpf),
                texto(&parte.ie),
                texto(&parte.rg),
                texto(&parte.cep),
                texto(&parte.rua),
                texto(&parte.complemento),
                texto(&parte.numero),
                texto(&parte.bairro),
                texto(&parte.ibge),
            ]);
        }

        campos
    }
}

/// Builder de [`DocumentoFiscal`]: um registro novo por remessa.
///
/// ```
/// use chrono::NaiveDate;
/// use converter_remessas_dhl::{DocumentoFiscalBuilder, Filial, Participante};
///
/// let data = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// let documento = DocumentoFiscalBuilder::new("AB123456", data, Filial::Poa)
///     .destinatario(Participante { nome: Some("FULANO".into()), ..Default::default() })
///     .build();
///
/// assert_eq!(documento.nota_fiscal, "123456");
/// assert_eq!(documento.recebedor(), &documento.destinatario);
/// ```
pub struct DocumentoFiscalBuilder {
    pedido: String,
    data_emissao: NaiveDate,
    filial: Filial,
    valor_nf: Decimal,
    peso: Decimal,
    qtd_volumes: Option<String>,
    codigo_volumes: Option<String>,
    destinatario: Participante,
}

impl DocumentoFiscalBuilder {
    pub fn new(pedido: impl Into<String>, data_emissao: NaiveDate, filial: Filial) -> Self {
        Self {
            pedido: pedido.into(),
            data_emissao,
            filial,
            valor_nf: Decimal::ONE,
            peso: Decimal::ONE,
            qtd_volumes: None,
            codigo_volumes: None,
            destinatario: Participante::default(),
        }
    }

    pub fn valor_nf(mut self, valor: Decimal) -> Self {
        self.valor_nf = valor;
        self
    }

    pub fn peso(mut self, peso: Decimal) -> Self {
        self.peso = peso;
        self
    }

    pub fn qtd_volumes(mut self, qtd: Option<String>) -> Self {
        self.qtd_volumes = qtd;
        self
    }

    pub fn codigo_volumes(mut self, codigo: Option<String>) -> Self {
        self.codigo_volumes = codigo;
        self
    }

    pub fn destinatario(mut self, destinatario: Participante) -> Self {
        self.destinatario = destinatario;
        self
    }

    pub fn build(self) -> DocumentoFiscal {
        DocumentoFiscal {
            nota_fiscal: ultimos_caracteres(&self.pedido, DIGITOS_NOTA_FISCAL),
            pedido: self.pedido,
            data_emissao: self.data_emissao,
            valor_nf: self.valor_nf,
            peso: self.peso,
            qtd_volumes: self.qtd_volumes,
            codigo_volumes: self.codigo_volumes,
            emitente: Participante::emitente(self.filial),
            destinatario: self.destinatario,
        }
    }
}

fn ultimos_caracteres(texto: &str, n: usize) -> String {
    let total = texto.chars().count();
    texto.chars().skip(total.saturating_sub(n)).collect()
}
