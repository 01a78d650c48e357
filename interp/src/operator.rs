use strum::{Display, EnumString};

/// Content stream operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum Operator {
    // path construction
    #[strum(serialize = "m")]
    MoveTo,
    #[strum(serialize = "l")]
    LineTo,
    #[strum(serialize = "c")]
    CurveTo,
    #[strum(serialize = "v")]
    CurveToV,
    #[strum(serialize = "y")]
    CurveToY,
    #[strum(serialize = "h")]
    ClosePath,
    #[strum(serialize = "re")]
    Rectangle,

    // path painting
    #[strum(serialize = "S")]
    Stroke,
    #[strum(serialize = "s")]
    CloseAndStroke,
    #[strum(serialize = "f", serialize = "F")]
    Fill,
    #[strum(serialize = "f*")]
    FillEvenOdd,
    #[strum(serialize = "B")]
    FillAndStroke,
    #[strum(serialize = "B*")]
    FillEvenOddAndStroke,
    #[strum(serialize = "b")]
    CloseFillAndStroke,
    #[strum(serialize = "b*")]
    CloseFillEvenOddAndStroke,
    #[strum(serialize = "n")]
    EndPath,
    #[strum(serialize = "W")]
    Clip,
    #[strum(serialize = "W*")]
    ClipEvenOdd,

    // graphics state
    #[strum(serialize = "q")]
    Save,
    #[strum(serialize = "Q")]
    Restore,
    #[strum(serialize = "cm")]
    ConcatMatrix,
    #[strum(serialize = "w")]
    SetLineWidth,
    #[strum(serialize = "J")]
    SetLineCap,
    #[strum(serialize = "j")]
    SetLineJoin,
    #[strum(serialize = "M")]
    SetMiterLimit,
    #[strum(serialize = "d")]
    SetDash,
    #[strum(serialize = "ri")]
    SetIntent,
    #[strum(serialize = "i")]
    SetFlatness,
    #[strum(serialize = "gs")]
    SetExtGState,

    // color
    #[strum(serialize = "g")]
    SetFillGray,
    #[strum(serialize = "G")]
    SetStrokeGray,
    #[strum(serialize = "rg")]
    SetFillRgb,
    #[strum(serialize = "RG")]
    SetStrokeRgb,
    #[strum(serialize = "k")]
    SetFillCmyk,
    #[strum(serialize = "K")]
    SetStrokeCmyk,
    #[strum(serialize = "cs")]
    SetFillColorSpace,
    #[strum(serialize = "CS")]
    SetStrokeColorSpace,
    #[strum(serialize = "sc", serialize = "scn")]
    SetFillColor,
    #[strum(serialize = "SC", serialize = "SCN")]
    SetStrokeColor,

    // text
    #[strum(serialize = "BT")]
    BeginText,
    #[strum(serialize = "ET")]
    EndText,
    #[strum(serialize = "Tc")]
    SetCharSpacing,
    #[strum(serialize = "Tw")]
    SetWordSpacing,
    #[strum(serialize = "Tz")]
    SetHorizontalScale,
    #[strum(serialize = "TL")]
    SetLeading,
    #[strum(serialize = "Tf")]
    SetFont,
    #[strum(serialize = "Tr")]
    SetRenderMode,
    #[strum(serialize = "Ts")]
    SetRise,
    #[strum(serialize = "Td")]
    MoveTextPosition,
    #[strum(serialize = "TD")]
    MoveTextPositionSetLeading,
    #[strum(serialize = "Tm")]
    SetTextMatrix,
    #[strum(serialize = "T*")]
    NextLine,
    #[strum(serialize = "Tj")]
    ShowText,
    #[strum(serialize = "TJ")]
    ShowTextArray,
    #[strum(serialize = "'")]
    NextLineShowText,
    #[strum(serialize = "\"")]
    NextLineSetSpacingShowText,

    // Type 3 glyph
    #[strum(serialize = "d0")]
    SetGlyphWidth,
    #[strum(serialize = "d1")]
    SetGlyphWidthAndBBox,

    // XObjects, images and shadings
    #[strum(serialize = "Do")]
    PaintXObject,
    #[strum(serialize = "BI")]
    BeginInlineImage,
    #[strum(serialize = "sh")]
    PaintShading,

    // marked content
    #[strum(serialize = "MP")]
    MarkedContentPoint,
    #[strum(serialize = "DP")]
    MarkedContentPointWithProperties,
    #[strum(serialize = "BMC")]
    BeginMarkedContent,
    #[strum(serialize = "BDC")]
    BeginMarkedContentWithProperties,
    #[strum(serialize = "EMC")]
    EndMarkedContent,

    // compatibility
    #[strum(serialize = "BX")]
    BeginCompatibility,
    #[strum(serialize = "EX")]
    EndCompatibility,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use test_case::test_case;

    #[test_case("re" => Some(Operator::Rectangle))]
    #[test_case("F" => Some(Operator::Fill); "obsolete fill")]
    #[test_case("f*" => Some(Operator::FillEvenOdd))]
    #[test_case("scn" => Some(Operator::SetFillColor))]
    #[test_case("'" => Some(Operator::NextLineShowText))]
    #[test_case("\"" => Some(Operator::NextLineSetSpacingShowText))]
    #[test_case("BDC" => Some(Operator::BeginMarkedContentWithProperties))]
    #[test_case("EI" => None; "inline image end is not an operator")]
    #[test_case("foo" => None)]
    fn parse(s: &str) -> Option<Operator> {
        Operator::from_str(s).ok()
    }
}
