macro_rules! pinout {
    ($p:ident . can) => ($p.CAN1);
    ($p:ident . can_rx) => ($p.PB8);
    ($p:ident . can_tx) => ($p.PB9);

    ($p:ident . diag_usart) => ($p.USART2);
    ($p:ident . diag_tx) => ($p.PA2);

    ($p:ident . stats_btn) => ($p.PA0); // user button, also WKUP

    ($p:ident . led_first_mover) => ($p.PD12); // green
    ($p:ident . led_referee) => ($p.PD13); // orange
    ($p:ident . led_tie) => ($p.PD14); // red
    ($p:ident . led_error) => ($p.PD15); // blue
}
